use teloxide::types::{KeyboardButton, KeyboardMarkup, ReplyMarkup};

use crate::{bank::ExamType, render::Keyboard};

pub const STOP: &str = "Стоп";
pub const CONTINUE: &str = "Продолжить";

pub(crate) fn exam_types_keyboard(exam_types: &[ExamType]) -> KeyboardMarkup {
    let keyboard: Vec<Vec<KeyboardButton>> = vec![exam_types
        .iter()
        .map(|exam| KeyboardButton::new(exam.label()))
        .collect()];

    KeyboardMarkup::new(keyboard).resize_keyboard()
}

pub(crate) fn solving_keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![vec![KeyboardButton::new(STOP)]]).resize_keyboard()
}

pub(crate) fn confirm_stop_keyboard() -> KeyboardMarkup {
    let keyboard: Vec<Vec<KeyboardButton>> = vec![vec![
        KeyboardButton::new(STOP),
        KeyboardButton::new(CONTINUE),
    ]];

    KeyboardMarkup::new(keyboard).resize_keyboard()
}

/// `None` means no markup is attached and the client keeps its keyboard.
pub(crate) fn reply_markup(keyboard: &Keyboard) -> Option<ReplyMarkup> {
    match keyboard {
        Keyboard::Unchanged => None,
        Keyboard::Remove => Some(ReplyMarkup::kb_remove()),
        Keyboard::ExamTypes(exam_types) => Some(exam_types_keyboard(exam_types).into()),
        Keyboard::Solving => Some(solving_keyboard().into()),
        Keyboard::ConfirmStop => Some(confirm_stop_keyboard().into()),
    }
}
