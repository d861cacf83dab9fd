//! Calibration dialog on a text terminal

use mscope_core::{CalibrationMenu, CalibrationSelector, ChoiceWidget, Selection};
use std::io::{self, BufRead, Write};

/// Shows the menu on `output` and reads the choice from `input`
///
/// The two checkboxes are decided by command-line flags and only shown.
/// End of input or `q` cancels.
#[derive(Debug)]
pub struct PromptSelector<R, W> {
    input: R,
    output: W,
    apply_globally: bool,
    add_scale_bar: bool,
}

enum Choice {
    Pick(usize),
    Cancel,
    Invalid,
}

impl<R: BufRead, W: Write> PromptSelector<R, W> {
    pub fn new(input: R, output: W, apply_globally: bool, add_scale_bar: bool) -> Self {
        Self { input, output, apply_globally, add_scale_bar }
    }

    fn show(&mut self, menu: &CalibrationMenu) -> io::Result<()> {
        let out = &mut self.output;
        writeln!(out, "{}", menu.title)?;
        writeln!(out, "{}", menu.prompt)?;
        for (i, label) in menu.labels.iter().enumerate() {
            match menu.widget {
                ChoiceWidget::RadioGroup => {
                    let mark = if i == menu.default_index { '*' } else { ' ' };
                    writeln!(out, "  ({mark}) {}. {label}", i + 1)?;
                }
                ChoiceWidget::DropDown => writeln!(out, "  {:>3}. {label}", i + 1)?,
            }
        }
        writeln!(out, "  [{}] {}", checkbox(self.apply_globally), menu.apply_all_label)?;
        writeln!(out, "  [{}] {}", checkbox(self.add_scale_bar), menu.scale_bar_label)?;
        if let Some(footer) = &menu.footer {
            writeln!(out, "{footer}")?;
        }
        Ok(())
    }

    fn read_choice(&mut self, menu: &CalibrationMenu) -> io::Result<Choice> {
        write!(self.output, "Selection [{}]: ", menu.default_index + 1)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(Choice::Cancel);
        }
        Ok(parse_choice(line.trim(), menu))
    }
}

fn checkbox(checked: bool) -> char {
    if checked {
        'x'
    } else {
        ' '
    }
}

fn parse_choice(answer: &str, menu: &CalibrationMenu) -> Choice {
    if answer.is_empty() {
        return Choice::Pick(menu.default_index);
    }
    if answer.eq_ignore_ascii_case("q") {
        return Choice::Cancel;
    }
    if let Ok(number) = answer.parse::<usize>() {
        return match number.checked_sub(1) {
            Some(index) if index < menu.labels.len() => Choice::Pick(index),
            _ => Choice::Invalid,
        };
    }
    match menu.labels.iter().position(|label| label == answer) {
        Some(index) => Choice::Pick(index),
        None => Choice::Invalid,
    }
}

impl<R: BufRead, W: Write> CalibrationSelector for PromptSelector<R, W> {
    fn select(&mut self, menu: &CalibrationMenu) -> Option<Selection> {
        if let Err(err) = self.show(menu) {
            log::warn!("cannot show calibration menu: {err}");
            return None;
        }

        loop {
            match self.read_choice(menu) {
                Ok(Choice::Pick(index)) => {
                    return Some(Selection {
                        index,
                        apply_globally: self.apply_globally,
                        add_scale_bar: self.add_scale_bar,
                    });
                }
                Ok(Choice::Cancel) => return None,
                Ok(Choice::Invalid) => {
                    if let Err(err) = writeln!(
                        self.output,
                        "Enter a number from 1 to {}, or q to cancel.",
                        menu.labels.len()
                    ) {
                        log::warn!("cannot show calibration menu: {err}");
                        return None;
                    }
                }
                Err(err) => {
                    log::warn!("cannot read calibration choice: {err}");
                    return None;
                }
            }
        }
    }
}
