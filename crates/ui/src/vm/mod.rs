mod quiz_vm;

pub use quiz_vm::{start_quiz, OptionRow, PickerCell, QuizIntent, QuizVm};
