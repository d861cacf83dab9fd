//! The calibration choice presented to the user
//!
//! [`CalibrationMenu`] describes the dialog; a [`CalibrationSelector`]
//! shows it however the front end likes and reports the choice.

use crate::registry::CalibrationRegistry;

/// Above this many calibrations the menu switches to a drop-down list
pub const DROPDOWN_THRESHOLD: usize = 20;

pub const MENU_TITLE: &str = "Microscope Calibrations";
pub const MENU_PROMPT: &str = "Choose the calibration to load:";
pub const APPLY_ALL_LABEL: &str = "Apply Scale to all open images?";
pub const SCALE_BAR_LABEL: &str = "Add Scale Bar to this image?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceWidget {
    RadioGroup,
    DropDown,
}

impl ChoiceWidget {
    pub fn for_len(len: usize) -> Self {
        if len > DROPDOWN_THRESHOLD {
            ChoiceWidget::DropDown
        } else {
            ChoiceWidget::RadioGroup
        }
    }
}

/// Everything a front end needs to render the calibration dialog
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationMenu {
    pub title: &'static str,
    pub prompt: &'static str,
    pub labels: Vec<String>,
    pub widget: ChoiceWidget,
    pub default_index: usize,
    pub apply_all_label: &'static str,
    pub scale_bar_label: &'static str,
    /// Where the user can edit the calibrations
    pub footer: Option<String>,
}

impl CalibrationMenu {
    pub fn new(registry: &CalibrationRegistry) -> Self {
        Self {
            title: MENU_TITLE,
            prompt: MENU_PROMPT,
            labels: registry.labels(),
            widget: ChoiceWidget::for_len(registry.len()),
            default_index: 0,
            apply_all_label: APPLY_ALL_LABEL,
            scale_bar_label: SCALE_BAR_LABEL,
            footer: None,
        }
    }

    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }
}

/// The user's answer to the calibration dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub index: usize,
    pub apply_globally: bool,
    pub add_scale_bar: bool,
}

impl Selection {
    pub fn new(index: usize) -> Self {
        Self { index, apply_globally: false, add_scale_bar: false }
    }
}

/// Shows the calibration dialog; `None` means the user cancelled
pub trait CalibrationSelector {
    fn select(&mut self, menu: &CalibrationMenu) -> Option<Selection>;
}

/// Selector answering with a choice made up front
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresetSelector {
    selection: Option<Selection>,
}

impl PresetSelector {
    pub fn new(selection: Selection) -> Self {
        Self { selection: Some(selection) }
    }

    pub fn cancelled() -> Self {
        Self { selection: None }
    }
}

impl CalibrationSelector for PresetSelector {
    fn select(&mut self, menu: &CalibrationMenu) -> Option<Selection> {
        self.selection.filter(|selection| selection.index < menu.labels.len())
    }
}
