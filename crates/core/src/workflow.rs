//! The "choose a calibration" action, start to finish

use crate::applier::{self, Applied};
use crate::error::{Error, Result};
use crate::host::{ImageHost, ImageId};
use crate::registry::CalibrationRegistry;
use crate::selector::{CalibrationMenu, CalibrationSelector};

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The user closed the dialog; nothing was changed
    Cancelled,
    Applied {
        image: ImageId,
        applied: Applied,
        scale_bar: bool,
    },
}

/// Ask the user for a calibration and install it on the current image
///
/// `footer` is shown under the choices, typically the settings file path.
pub fn choose_calibration<H, S>(
    host: &mut H,
    registry: &CalibrationRegistry,
    selector: &mut S,
    footer: Option<&str>,
) -> Result<Outcome>
where
    H: ImageHost + ?Sized,
    S: CalibrationSelector + ?Sized,
{
    let image = host.current_image()?;

    let mut menu = CalibrationMenu::new(registry);
    if let Some(footer) = footer {
        menu = menu.with_footer(footer);
    }

    let Some(selection) = selector.select(&menu) else {
        log::debug!("calibration dialog cancelled");
        return Ok(Outcome::Cancelled);
    };

    let source = registry
        .get(selection.index)
        .ok_or(Error::InvalidSelection { index: selection.index, len: registry.len() })?;

    let applied = applier::apply(host, image, source, selection.apply_globally)?;

    if selection.add_scale_bar {
        host.add_scale_bar(image)?;
    }

    Ok(Outcome::Applied { image, applied, scale_bar: selection.add_scale_bar })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::applier::tests::FakeHost;
    use crate::calibration::tests::StubProvider;
    use crate::calibration::CalibrationSource;
    use crate::error::{CalibrationError, HostError};
    use crate::host::ImageCalibration;
    use crate::selector::{PresetSelector, Selection};

    fn registry() -> CalibrationRegistry {
        CalibrationRegistry::new(vec![
            CalibrationSource::fixed("FluoroScope 5x", 0.9058, "um", 1.0),
            CalibrationSource::fixed("FluoroScope 20x", 1.81, "um", 1.0),
            CalibrationSource::provider(StubProvider { value: None }),
        ])
        .unwrap()
    }

    /// Selector that ignores the menu bounds
    struct Raw(Selection);

    impl CalibrationSelector for Raw {
        fn select(&mut self, _menu: &CalibrationMenu) -> Option<Selection> {
            Some(self.0)
        }
    }

    #[test]
    fn cancel_changes_nothing() {
        let mut host = FakeHost::with_images(2);
        let outcome =
            choose_calibration(&mut host, &registry(), &mut PresetSelector::cancelled(), None)
                .unwrap();

        assert_eq!(outcome, Outcome::Cancelled);
        assert!(host.refreshes.is_empty());
        assert_eq!(host.own_calibration(ImageId(1)), &ImageCalibration::default());
    }

    #[test]
    fn applies_selected_entry_to_current_image() {
        let mut host = FakeHost::with_images(2);
        host.current = Some(ImageId(2));
        let mut selector = PresetSelector::new(Selection::new(1));

        let outcome = choose_calibration(&mut host, &registry(), &mut selector, None).unwrap();

        let Outcome::Applied { image, applied, scale_bar } = outcome else {
            panic!("expected an applied calibration");
        };
        assert_eq!(image, ImageId(2));
        assert_eq!(applied.entry.display_name, "FluoroScope 20x");
        assert!(!scale_bar);
        assert!(host.scale_bars.is_empty());
        assert_eq!(host.own_calibration(ImageId(1)), &ImageCalibration::default());
    }

    #[test]
    fn scale_bar_requested_after_apply() {
        let mut host = FakeHost::with_images(1);
        let selection = Selection { add_scale_bar: true, ..Selection::new(0) };

        choose_calibration(&mut host, &registry(), &mut PresetSelector::new(selection), None)
            .unwrap();

        assert_eq!(host.scale_bars, vec![ImageId(1)]);
        assert_eq!(host.refreshes, vec![ImageId(1)]);
    }

    #[test]
    fn failed_provider_skips_scale_bar() {
        let mut host = FakeHost::with_images(1);
        let selection = Selection { add_scale_bar: true, ..Selection::new(2) };

        let err =
            choose_calibration(&mut host, &registry(), &mut PresetSelector::new(selection), None)
                .unwrap_err();

        assert!(matches!(err, Error::Calibration(CalibrationError::Compute { .. })));
        assert!(host.scale_bars.is_empty());
    }

    #[test]
    fn no_open_image_fails_before_asking() {
        let mut host = FakeHost::default();
        let err = choose_calibration(
            &mut host,
            &registry(),
            &mut PresetSelector::new(Selection::new(0)),
            None,
        )
        .unwrap_err();

        assert!(matches!(err, Error::Host(HostError::NoImage)));
    }

    #[test]
    fn out_of_range_selection_is_rejected() {
        let mut host = FakeHost::with_images(1);
        let err = choose_calibration(&mut host, &registry(), &mut Raw(Selection::new(7)), None)
            .unwrap_err();

        assert!(matches!(err, Error::InvalidSelection { index: 7, len: 3 }));
        assert!(host.refreshes.is_empty());
    }
}
