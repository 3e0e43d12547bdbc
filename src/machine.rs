use rand::{Rng, RngCore};
use tracing::{debug, warn};

use crate::{
    bank::{ExamType, QuestionBank, Variant},
    keyboard::{CONTINUE, STOP},
    render::{self, texts, Keyboard, Outbound, ResultsStyle},
    score::score,
    state::{QuizState, Session},
};

/// What the user sent, stripped of transport details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Start,
    Solve,
    Text(String),
    /// Stickers, photos and anything else without text.
    Unsupported,
}

impl Input {
    fn is_word(&self, word: &str) -> bool {
        match self {
            Input::Text(text) => text.trim().to_lowercase() == word.to_lowercase(),
            _ => false,
        }
    }
}

/// Outcome of one inbound message: the state to commit and the replies to send
/// before committing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub next: QuizState,
    pub replies: Vec<Outbound>,
}

impl Step {
    fn stay(state: &QuizState, reply: Outbound) -> Self {
        Self {
            next: state.clone(),
            replies: vec![reply],
        }
    }
}

type Transition = fn(&QuizMachine, &QuizState, &Input, &mut dyn RngCore) -> Step;

struct Rule {
    name: &'static str,
    state: fn(&QuizState) -> bool,
    input: fn(&Input) -> bool,
    apply: Transition,
}

// First match wins, so specific predicates come before broad ones.
const RULES: &[Rule] = &[
    Rule {
        name: "greet",
        state: any_state,
        input: |input| matches!(input, Input::Start),
        apply: QuizMachine::greet,
    },
    Rule {
        name: "begin",
        state: |state| matches!(state, QuizState::Idle | QuizState::ChoosingExamType),
        input: |input| matches!(input, Input::Solve),
        apply: QuizMachine::begin,
    },
    Rule {
        name: "reject_restart",
        state: has_session,
        input: |input| matches!(input, Input::Solve),
        apply: QuizMachine::reject_restart,
    },
    Rule {
        name: "choose_exam",
        state: |state| matches!(state, QuizState::ChoosingExamType),
        input: |input| matches!(input, Input::Text(text) if ExamType::from_label(text).is_some()),
        apply: QuizMachine::choose_exam,
    },
    Rule {
        name: "choose_exam_again",
        state: |state| matches!(state, QuizState::ChoosingExamType),
        input: any_input,
        apply: QuizMachine::choose_exam_again,
    },
    Rule {
        name: "ask_stop",
        state: |state| matches!(state, QuizState::Solving(_)),
        input: |input| input.is_word(STOP),
        apply: QuizMachine::ask_stop,
    },
    Rule {
        name: "stop",
        state: |state| matches!(state, QuizState::ConfirmingStop(_)),
        input: |input| input.is_word(STOP),
        apply: QuizMachine::stop,
    },
    Rule {
        name: "resume",
        state: |state| matches!(state, QuizState::ConfirmingStop(_)),
        input: |input| input.is_word(CONTINUE),
        apply: QuizMachine::resume,
    },
    Rule {
        name: "nothing_to_stop",
        state: |state| matches!(state, QuizState::Idle),
        input: |input| input.is_word(STOP),
        apply: QuizMachine::nothing_to_stop,
    },
    Rule {
        name: "answer",
        state: |state| matches!(state, QuizState::Solving(_)),
        input: |input| matches!(input, Input::Text(_)),
        apply: QuizMachine::answer,
    },
];

static UNKNOWN: Rule = Rule {
    name: "unknown",
    state: any_state,
    input: any_input,
    apply: QuizMachine::unknown,
};

fn any_state(_: &QuizState) -> bool {
    true
}

fn any_input(_: &Input) -> bool {
    true
}

fn has_session(state: &QuizState) -> bool {
    state.session().is_some()
}

/// Decides, for a user's current state and inbound input, the next state and
/// the replies. Holds the shared read-only question bank; never touches
/// session storage itself.
#[derive(Debug)]
pub struct QuizMachine {
    bank: QuestionBank,
    results_style: ResultsStyle,
}

impl QuizMachine {
    pub fn new(bank: QuestionBank, results_style: ResultsStyle) -> Self {
        Self {
            bank,
            results_style,
        }
    }

    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    pub fn handle(&self, state: &QuizState, input: &Input, rng: &mut dyn RngCore) -> Step {
        let rule = RULES
            .iter()
            .find(|rule| (rule.state)(state) && (rule.input)(input))
            .unwrap_or(&UNKNOWN);
        debug!("State '{}' matched rule '{}'", state.name(), rule.name);

        (rule.apply)(self, state, input, rng)
    }

    fn greet(&self, state: &QuizState, _: &Input, _: &mut dyn RngCore) -> Step {
        Step::stay(state, Outbound::text(texts::HELLO, Keyboard::Remove))
    }

    fn begin(&self, _: &QuizState, _: &Input, rng: &mut dyn RngCore) -> Step {
        if self.bank.requires_exam_type() {
            return Step {
                next: QuizState::ChoosingExamType,
                replies: vec![Outbound::text(
                    texts::CHOOSE_EXAM,
                    Keyboard::ExamTypes(self.bank.exam_types()),
                )],
            };
        }

        self.start_variant(None, rng)
    }

    fn reject_restart(&self, state: &QuizState, _: &Input, _: &mut dyn RngCore) -> Step {
        Step::stay(state, Outbound::text(texts::ALREADY_SOLVING, Keyboard::Unchanged))
    }

    fn choose_exam(&self, state: &QuizState, input: &Input, rng: &mut dyn RngCore) -> Step {
        let exam_type = match input {
            Input::Text(text) => ExamType::from_label(text),
            _ => None,
        };

        match exam_type {
            Some(exam_type) if self.bank.bucket(Some(exam_type)).is_some() => {
                self.start_variant(Some(exam_type), rng)
            }
            _ => self.choose_exam_again(state, input, rng),
        }
    }

    fn choose_exam_again(&self, state: &QuizState, _: &Input, _: &mut dyn RngCore) -> Step {
        Step::stay(
            state,
            Outbound::text(
                texts::CHOOSE_EXAM_AGAIN,
                Keyboard::ExamTypes(self.bank.exam_types()),
            ),
        )
    }

    fn ask_stop(&self, state: &QuizState, input: &Input, rng: &mut dyn RngCore) -> Step {
        let Some(session) = state.session() else {
            return self.unknown(state, input, rng);
        };

        Step {
            next: QuizState::ConfirmingStop(session.clone()),
            replies: vec![Outbound::text(texts::CONFIRM_STOP, Keyboard::ConfirmStop)],
        }
    }

    fn stop(&self, state: &QuizState, _: &Input, _: &mut dyn RngCore) -> Step {
        match state.session() {
            Some(session) => self.finish(session),
            None => Step {
                next: QuizState::Idle,
                replies: vec![Outbound::text(texts::NOTHING_TO_STOP, Keyboard::Remove)],
            },
        }
    }

    fn resume(&self, state: &QuizState, input: &Input, rng: &mut dyn RngCore) -> Step {
        let Some(session) = state.session() else {
            return self.unknown(state, input, rng);
        };
        let Some(variant) = self.variant_of(session) else {
            return self.variant_unavailable(session);
        };

        let mut replies = vec![Outbound::text(texts::RESUMED, Keyboard::Solving)];
        if let Some(task) = variant.task(session.task_index()) {
            replies.push(render::task(task, session.task_index() + 1));
        }

        Step {
            next: QuizState::Solving(session.clone()),
            replies,
        }
    }

    fn nothing_to_stop(&self, state: &QuizState, _: &Input, _: &mut dyn RngCore) -> Step {
        Step::stay(state, Outbound::text(texts::NOTHING_TO_STOP, Keyboard::Unchanged))
    }

    fn answer(&self, state: &QuizState, input: &Input, rng: &mut dyn RngCore) -> Step {
        let (Some(session), Input::Text(answer)) = (state.session(), input) else {
            return self.unknown(state, input, rng);
        };
        let Some(variant) = self.variant_of(session) else {
            return self.variant_unavailable(session);
        };

        let mut session = session.clone();
        session.record_answer(answer.as_str());

        match variant.task(session.task_index()) {
            Some(next_task) => {
                let reply = render::task(next_task, session.task_index() + 1);
                Step {
                    next: QuizState::Solving(session),
                    replies: vec![reply],
                }
            }
            None => self.finish(&session),
        }
    }

    fn unknown(&self, state: &QuizState, _: &Input, _: &mut dyn RngCore) -> Step {
        Step::stay(state, Outbound::text(texts::UNKNOWN, Keyboard::Unchanged))
    }

    fn start_variant(&self, exam_type: Option<ExamType>, rng: &mut dyn RngCore) -> Step {
        let variants = self.bank.bucket(exam_type).unwrap_or_default();
        if variants.is_empty() {
            warn!("No variants available for exam type {:?}", exam_type);
            return Step {
                next: QuizState::Idle,
                replies: vec![Outbound::text(texts::VARIANT_UNAVAILABLE, Keyboard::Remove)],
            };
        }

        let variant_index = rng.gen_range(0..=variants.len() - 1);
        let session = Session::new(exam_type, variant_index);
        let mut replies = vec![render::variant_banner(variant_index)];
        if let Some(first) = variants[variant_index].task(0) {
            replies.push(render::task(first, 1));
        }

        Step {
            next: QuizState::Solving(session),
            replies,
        }
    }

    fn finish(&self, session: &Session) -> Step {
        let Some(variant) = self.variant_of(session) else {
            return self.variant_unavailable(session);
        };
        let results = score(variant, session.answers());

        Step {
            next: QuizState::Idle,
            replies: vec![render::results(&results, self.results_style)],
        }
    }

    fn variant_of(&self, session: &Session) -> Option<&Variant> {
        self.bank
            .variant(session.exam_type(), session.variant_index())
    }

    fn variant_unavailable(&self, session: &Session) -> Step {
        warn!(
            "Variant {} of exam type {:?} is not in the bank, resetting session",
            session.variant_index(),
            session.exam_type()
        );
        Step {
            next: QuizState::Idle,
            replies: vec![Outbound::text(texts::VARIANT_UNAVAILABLE, Keyboard::Remove)],
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::render::Body;

    const FLAT: &str = r#"[[{"text": "2+2", "answer": "4"}, {"text": "3*3", "answer": "9"}]]"#;

    fn machine(raw: &str) -> QuizMachine {
        QuizMachine::new(QuestionBank::from_json(raw).unwrap(), ResultsStyle::Brief)
    }

    fn text(s: &str) -> Input {
        Input::Text(s.to_owned())
    }

    fn solving(answers: &[&str]) -> QuizState {
        let mut session = Session::new(None, 0);
        for answer in answers {
            session.record_answer(*answer);
        }
        QuizState::Solving(session)
    }

    #[test]
    fn flat_bank_starts_solving_directly() {
        let machine = machine(FLAT);
        let mut rng = StdRng::seed_from_u64(1);

        let step = machine.handle(&QuizState::Idle, &Input::Solve, &mut rng);

        assert_eq!(step.next, QuizState::Solving(Session::new(None, 0)));
        assert_eq!(step.replies.len(), 2);
        assert_eq!(step.replies[0].content(), "ВАРИАНТ №1");
        assert_eq!(step.replies[1].body, Body::Text("ЗАДАНИЕ №1\n\n2+2".into()));
        assert_eq!(step.replies[1].keyboard, Keyboard::Solving);
    }

    #[test]
    fn solve_while_solving_is_rejected_without_change() {
        let machine = machine(FLAT);
        let mut rng = StdRng::seed_from_u64(1);
        let state = solving(&["4"]);

        let step = machine.handle(&state, &Input::Solve, &mut rng);
        assert_eq!(step.next, state);
        assert_eq!(step.replies[0].content(), texts::ALREADY_SOLVING);

        let confirming = QuizState::ConfirmingStop(Session::new(None, 0));
        let step = machine.handle(&confirming, &Input::Solve, &mut rng);
        assert_eq!(step.next, confirming);
    }

    #[test]
    fn answers_advance_until_results() {
        let machine = machine(FLAT);
        let mut rng = StdRng::seed_from_u64(1);

        let step = machine.handle(&solving(&[]), &text("4"), &mut rng);
        assert_eq!(step.next, solving(&["4"]));
        assert_eq!(step.replies[0].content(), "ЗАДАНИЕ №2\n\n3*3");

        let step = machine.handle(&step.next, &text("10"), &mut rng);
        assert_eq!(step.next, QuizState::Idle);
        assert_eq!(
            step.replies[0].content(),
            "Результаты:\n\n1) +\n2) -\n\nВаш результат: 1/2"
        );
    }

    #[test]
    fn stop_words_are_not_taken_as_answers() {
        let machine = machine(FLAT);
        let mut rng = StdRng::seed_from_u64(1);
        let state = solving(&["4"]);

        let step = machine.handle(&state, &text("СТОП"), &mut rng);
        assert_eq!(step.next, QuizState::ConfirmingStop(state.session().unwrap().clone()));
        assert_eq!(step.replies[0].keyboard, Keyboard::ConfirmStop);

        let resumed = machine.handle(&step.next, &text("продолжить"), &mut rng);
        assert_eq!(resumed.next, state);
        assert_eq!(resumed.replies[0].content(), texts::RESUMED);
        assert_eq!(resumed.replies[1].content(), "ЗАДАНИЕ №2\n\n3*3");
    }

    #[test]
    fn confirmed_stop_reports_partial_results() {
        let machine = machine(FLAT);
        let mut rng = StdRng::seed_from_u64(1);
        let mut session = Session::new(None, 0);
        session.record_answer("5");

        let step = machine.handle(&QuizState::ConfirmingStop(session), &text("Стоп"), &mut rng);

        assert_eq!(step.next, QuizState::Idle);
        assert_eq!(
            step.replies[0].content(),
            "Результаты:\n\n1) -\n\nВаш результат: 0/1"
        );
    }

    #[test]
    fn idle_stop_reports_nothing_in_progress() {
        let machine = machine(FLAT);
        let mut rng = StdRng::seed_from_u64(1);

        let step = machine.handle(&QuizState::Idle, &text("стоп"), &mut rng);

        assert_eq!(step.next, QuizState::Idle);
        assert_eq!(step.replies[0].content(), texts::NOTHING_TO_STOP);
    }

    #[test]
    fn unrecognized_input_leaves_state_alone() {
        let machine = machine(FLAT);
        let mut rng = StdRng::seed_from_u64(1);

        for state in [
            QuizState::Idle,
            QuizState::ConfirmingStop(Session::new(None, 0)),
            solving(&[]),
        ] {
            let input = if matches!(state, QuizState::Solving(_)) {
                Input::Unsupported
            } else {
                text("привет")
            };
            let step = machine.handle(&state, &input, &mut rng);
            assert_eq!(step.next, state);
            assert_eq!(step.replies[0].content(), texts::UNKNOWN);
        }
    }

    #[test]
    fn greeting_keeps_progress() {
        let machine = machine(FLAT);
        let mut rng = StdRng::seed_from_u64(1);
        let state = solving(&["4"]);

        let step = machine.handle(&state, &Input::Start, &mut rng);

        assert_eq!(step.next, state);
        assert_eq!(step.replies[0].content(), texts::HELLO);
    }

    #[test]
    fn keyed_bank_asks_for_exam_type_first() {
        let machine = machine(
            r#"{"oge": [[{"text": "a", "answer": "1"}]], "ege": [[{"text": "b", "answer": "2"}]]}"#,
        );
        let mut rng = StdRng::seed_from_u64(1);

        let step = machine.handle(&QuizState::Idle, &Input::Solve, &mut rng);
        assert_eq!(step.next, QuizState::ChoosingExamType);
        assert_eq!(
            step.replies[0].keyboard,
            Keyboard::ExamTypes(vec![ExamType::Oge, ExamType::Ege])
        );

        let step = machine.handle(&step.next, &text("стоп"), &mut rng);
        assert_eq!(step.next, QuizState::ChoosingExamType);
        assert_eq!(step.replies[0].content(), texts::CHOOSE_EXAM_AGAIN);

        let step = machine.handle(&step.next, &text("егэ"), &mut rng);
        assert_eq!(
            step.next,
            QuizState::Solving(Session::new(Some(ExamType::Ege), 0))
        );
        assert_eq!(step.replies[1].content(), "ЗАДАНИЕ №1\n\nb");
    }

    #[test]
    fn exam_type_missing_from_bank_is_reprompted() {
        let machine = machine(r#"{"oge": [[{"text": "a", "answer": "1"}]]}"#);
        let mut rng = StdRng::seed_from_u64(1);

        let step = machine.handle(&QuizState::ChoosingExamType, &text("ЕГЭ"), &mut rng);

        assert_eq!(step.next, QuizState::ChoosingExamType);
        assert_eq!(step.replies[0].keyboard, Keyboard::ExamTypes(vec![ExamType::Oge]));
    }

    #[test]
    fn stale_session_is_reset() {
        let machine = machine(FLAT);
        let mut rng = StdRng::seed_from_u64(1);
        let state = QuizState::Solving(Session::new(None, 42));

        let step = machine.handle(&state, &text("4"), &mut rng);

        assert_eq!(step.next, QuizState::Idle);
        assert_eq!(step.replies[0].content(), texts::VARIANT_UNAVAILABLE);
    }
}
