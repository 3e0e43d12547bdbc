use std::{fmt::Write, path::PathBuf, str::FromStr};

use thiserror::Error;

use crate::{
    bank::{ExamType, Task},
    score::Results,
};

pub mod texts {
    pub const HELLO: &str = "👋 Привет!
Ты в умном боте для подготовки к ЕГЭ и ОГЭ по математике.

Здесь ты сможешь:
✅ Решить случайный вариант экзамена.
✅ Проверить свои ответы.
✅ Узнать свой результат.

🚀 Нажми /solve, чтобы начать, и отправляй ответы по одному на каждое задание.
И помни: каждая ошибка — это шаг к 100 баллам.

Готов проверить себя? Погнали! 🎯";
    pub const CHOOSE_EXAM: &str = "Выберите тип экзамена:";
    pub const CHOOSE_EXAM_AGAIN: &str =
        "Пожалуйста, выберите тип экзамена, используя кнопки ниже.";
    pub const ALREADY_SOLVING: &str = "Чтобы начать решать новый вариант, закончите старый.\n\
        Для прекращения решения теста нажмите \"Стоп\".";
    pub const CONFIRM_STOP: &str = "Вы действительно хотите прекратить решение теста?";
    pub const RESUMED: &str = "Решение заданий успешно восстановлено.";
    pub const NOTHING_TO_STOP: &str = "Чтобы оставить решение варианта, сначала нужно его начать.";
    pub const UNKNOWN: &str = "Неизвестная команда.";
    pub const VARIANT_UNAVAILABLE: &str =
        "Этот вариант больше недоступен. Начните новый с помощью /solve.";
}

/// Reply keyboard to attach to an outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keyboard {
    /// Leave whatever keyboard the user currently sees.
    Unchanged,
    Remove,
    ExamTypes(Vec<ExamType>),
    Solving,
    ConfirmStop,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Text(String),
    Photo { path: PathBuf, caption: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Markup {
    Plain,
    Html,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound {
    pub body: Body,
    pub keyboard: Keyboard,
    pub markup: Markup,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResultsStyle {
    /// `+`/`-` per item.
    #[default]
    Brief,
    /// Also echoes the given answer and, for mistakes, the expected one.
    Detailed,
}

#[derive(Debug, Error)]
#[error("unknown results style '{0}', expected 'brief' or 'detailed'")]
pub struct UnknownResultsStyle(String);

impl FromStr for ResultsStyle {
    type Err = UnknownResultsStyle;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "brief" => Ok(ResultsStyle::Brief),
            "detailed" => Ok(ResultsStyle::Detailed),
            _ => Err(UnknownResultsStyle(s.to_owned())),
        }
    }
}

impl Outbound {
    pub fn text(text: impl Into<String>, keyboard: Keyboard) -> Self {
        Self {
            body: Body::Text(text.into()),
            keyboard,
            markup: Markup::Plain,
        }
    }

    /// Message text, or the caption for photos.
    pub fn content(&self) -> &str {
        match &self.body {
            Body::Text(text) => text,
            Body::Photo { caption, .. } => caption,
        }
    }
}

/// Renders the task with its 1-based ordinal. Tasks with an image become a
/// photo with the same text as its caption.
pub fn task(task: &Task, ordinal: usize) -> Outbound {
    let text = format!("ЗАДАНИЕ №{ordinal}\n\n{}", task.prompt());
    let body = match task.image() {
        Some(path) => Body::Photo {
            path: path.to_owned(),
            caption: text,
        },
        None => Body::Text(text),
    };

    Outbound {
        body,
        keyboard: Keyboard::Solving,
        markup: Markup::Html,
    }
}

pub fn variant_banner(variant_index: usize) -> Outbound {
    Outbound::text(format!("ВАРИАНТ №{}", variant_index + 1), Keyboard::Remove)
}

pub fn results(results: &Results, style: ResultsStyle) -> Outbound {
    let mut text = String::from("Результаты:\n\n");

    for (idx, mark) in results.marks().iter().enumerate() {
        let sign = if mark.correct { '+' } else { '-' };
        // Writing into a String cannot fail.
        let _ = match (style, mark.correct) {
            (ResultsStyle::Brief, _) => writeln!(text, "{}) {sign}", idx + 1),
            (ResultsStyle::Detailed, true) => {
                writeln!(text, "{}) {sign} ваш ответ: {}", idx + 1, mark.given)
            }
            (ResultsStyle::Detailed, false) => writeln!(
                text,
                "{}) {sign} ваш ответ: {}, верный ответ: {}",
                idx + 1,
                mark.given,
                mark.expected
            ),
        };
    }

    let _ = write!(
        text,
        "\nВаш результат: {}/{}",
        results.correct_count(),
        results.total_count()
    );

    Outbound::text(text, Keyboard::Remove)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{bank::Variant, score::score};

    #[test]
    fn text_task_carries_solving_keyboard() {
        let out = task(&Task::new("Найдите x", "3", None), 2);

        assert_eq!(out.body, Body::Text("ЗАДАНИЕ №2\n\nНайдите x".into()));
        assert_eq!(out.keyboard, Keyboard::Solving);
        assert_eq!(out.markup, Markup::Html);
    }

    #[test]
    fn image_task_is_a_captioned_photo() {
        let out = task(&Task::new("По рисунку", "7", Some("img/5.png".into())), 1);

        assert_eq!(
            out.body,
            Body::Photo {
                path: "img/5.png".into(),
                caption: "ЗАДАНИЕ №1\n\nПо рисунку".into(),
            }
        );
        assert_eq!(out.content(), "ЗАДАНИЕ №1\n\nПо рисунку");
    }

    #[test]
    fn brief_results_summary() {
        let variant = Variant::new(vec![Task::new("a", "4", None), Task::new("b", "9", None)]);
        let out = results(&score(&variant, &["4".into(), "10".into()]), ResultsStyle::Brief);

        assert_eq!(
            out.content(),
            "Результаты:\n\n1) +\n2) -\n\nВаш результат: 1/2"
        );
        assert_eq!(out.keyboard, Keyboard::Remove);
        assert_eq!(out.markup, Markup::Plain);
    }

    #[test]
    fn detailed_results_show_expected_answers_for_mistakes() {
        let variant = Variant::new(vec![Task::new("a", "4", None), Task::new("b", "9", None)]);
        let out = results(
            &score(&variant, &["4".into(), "10".into()]),
            ResultsStyle::Detailed,
        );

        assert_eq!(
            out.content(),
            "Результаты:\n\n1) + ваш ответ: 4\n2) - ваш ответ: 10, верный ответ: 9\n\nВаш результат: 1/2"
        );
    }

    #[test]
    fn results_style_parses_case_insensitively() {
        assert_eq!("Detailed".parse::<ResultsStyle>().unwrap(), ResultsStyle::Detailed);
        assert_eq!("brief".parse::<ResultsStyle>().unwrap(), ResultsStyle::Brief);
        assert!("verbose".parse::<ResultsStyle>().is_err());
    }
}
