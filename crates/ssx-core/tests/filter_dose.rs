use ssx_core::config::FilterDoseParams;
use ssx_core::filter_dose::{filter_dose, DoseWindow};
use ssx_core::{ErrorKind, SsxError};
use ssx_model::{Experiment, ExperimentList, ImageRange, ImageSet, Oscillation, ReflectionTable, Scan};

fn images(first: u32, last: u32) -> ImageRange {
    ImageRange::new(first, last).unwrap()
}

fn sweep(identifier: &str, first: u32, last: u32) -> Experiment {
    let range = images(first, last);
    let scan = Scan::new(range, Oscillation::new(0.0, 0.1))
        .with_epochs((first..=last).map(f64::from).collect())
        .unwrap();
    Experiment::new(identifier)
        .with_scan(scan)
        .with_imageset(ImageSet::new("/data/run_#####.cbf", range))
}

fn reflections(rows: &[(i32, f64)]) -> ReflectionTable {
    let ids = rows.iter().map(|(id, _)| *id).collect();
    let xyz: Vec<[f64; 3]> = rows.iter().map(|(_, z)| [100.0, 200.0, *z]).collect();
    ReflectionTable::from_columns(ids, &xyz, vec![0; rows.len()]).unwrap()
}

fn dose(min: u32, max: u32) -> FilterDoseParams {
    FilterDoseParams {
        dose: Some([min, max]),
    }
}

#[test]
fn window_is_relative_to_first_image() {
    let window = DoseWindow::new(10, 30).unwrap();
    assert_eq!(window.bounds(&images(101, 200)), (110, 130));
    assert_eq!(
        window.image_range_for(&images(101, 200)).unwrap(),
        Some(images(110, 130))
    );
    assert_eq!(
        window.image_range_for(&images(1, 100)).unwrap(),
        Some(images(10, 30))
    );
}

#[test]
fn window_is_clamped_to_available_images() {
    let available = [images(1, 10), images(101, 200), images(7, 7), images(50, 49)];
    for min in 0..40 {
        for max in min..40 {
            let window = DoseWindow::new(min, max).unwrap();
            for range in &available {
                let (lo, hi) = window.bounds(range);
                assert!(u64::from(range.first()) <= lo, "lo below first for {range}");
                assert!(hi <= u64::from(range.last()), "hi above last for {range}");
                if let Some(kept) = window.image_range_for(range).unwrap() {
                    assert!(range.contains_range(&kept));
                }
            }
        }
    }
}

#[test]
fn truncates_scan_and_imageset_to_identical_frames() {
    let experiments: ExperimentList = [sweep("a", 101, 200)].into_iter().collect();
    let refl = reflections(&[]);

    let sliced = filter_dose(&experiments, &refl, &dose(10, 30)).unwrap();

    assert_eq!(sliced.windows, vec![Some(images(110, 130))]);
    let experiment = &sliced.experiments[0];
    let scan = experiment.scan.as_ref().unwrap();
    let imageset = experiment.imageset.as_ref().unwrap();
    assert_eq!(scan.image_range(), images(110, 130));
    assert_eq!(imageset.image_range(), images(110, 130));
    assert_eq!(scan.num_images(), imageset.len());
    assert_eq!(scan.num_images(), 21);
    assert_eq!(scan.epochs().first(), Some(&110.0));
    assert!((scan.oscillation().start - 0.9).abs() < 1e-9);

    // The input is left untouched.
    assert_eq!(
        experiments[0].scan.as_ref().unwrap().image_range(),
        images(101, 200)
    );
}

#[test]
fn drops_reflections_outside_each_experiments_window() {
    let experiments: ExperimentList = [sweep("a", 101, 200), sweep("b", 1, 50)]
        .into_iter()
        .collect();
    let refl = reflections(&[
        (0, 108.5), // image 109
        (1, 9.2),   // image 10
        (0, 109.0), // image 110
        (0, 129.9), // image 130
        (1, 30.0),  // image 31
        (0, 130.0), // image 131
        (1, 29.5),  // image 30
    ]);

    let sliced = filter_dose(&experiments, &refl, &dose(10, 30)).unwrap();

    assert_eq!(sliced.experiments.len(), 2);
    assert_eq!(sliced.windows, vec![Some(images(110, 130)), Some(images(10, 30))]);
    assert_eq!(sliced.reflections.ids().unwrap(), vec![0, 0, 1, 1]);
    assert_eq!(sliced.reflections.frames().unwrap(), vec![109.0, 129.9, 9.2, 29.5]);

    for (id, z) in sliced
        .reflections
        .ids()
        .unwrap()
        .into_iter()
        .zip(sliced.reflections.frames().unwrap())
    {
        let array = sliced.experiments[id as usize]
            .scan
            .as_ref()
            .unwrap()
            .array_range();
        assert!(z >= f64::from(array.start) && z < f64::from(array.end));
    }
}

#[test]
fn window_missing_every_image_leaves_empty_experiment() {
    let experiments: ExperimentList = [sweep("a", 1, 20), sweep("b", 1, 100)]
        .into_iter()
        .collect();
    let refl = reflections(&[(0, 5.5), (1, 55.5), (1, 80.5)]);

    let sliced = filter_dose(&experiments, &refl, &dose(50, 90)).unwrap();

    assert_eq!(sliced.experiments.len(), 2);
    assert_eq!(sliced.windows, vec![None, Some(images(50, 90))]);
    let empty = &sliced.experiments[0];
    assert!(empty.scan.as_ref().unwrap().is_empty());
    assert!(empty.imageset.as_ref().unwrap().is_empty());
    assert_eq!(sliced.reflections.ids().unwrap(), vec![1, 1]);
}

#[test]
fn zero_dose_max_selects_nothing() {
    let experiments: ExperimentList = [sweep("a", 1, 20)].into_iter().collect();
    let refl = reflections(&[(0, 0.5)]);
    let sliced = filter_dose(&experiments, &refl, &dose(0, 0)).unwrap();
    assert_eq!(sliced.windows, vec![None]);
    assert!(sliced.reflections.is_empty());
}

#[test]
fn inverted_window_is_a_configuration_error() {
    let experiments: ExperimentList = [sweep("a", 1, 20)].into_iter().collect();
    let err = filter_dose(&experiments, &reflections(&[]), &dose(30, 10)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);

    let err = filter_dose(&experiments, &reflections(&[]), &FilterDoseParams::default())
        .unwrap_err();
    assert!(matches!(err, SsxError::Config { name: "dose", .. }));
}

#[test]
fn experiment_without_scan_is_an_input_error() {
    let experiments: ExperimentList = [sweep("a", 1, 20), Experiment::new("still")]
        .into_iter()
        .collect();
    let err = filter_dose(&experiments, &reflections(&[]), &dose(1, 5)).unwrap_err();
    assert!(matches!(err, SsxError::MissingScan { position: 1 }));
    assert_eq!(err.kind(), ErrorKind::InputConsistency);
}

#[test]
fn dangling_owner_is_an_input_error() {
    let experiments: ExperimentList = [sweep("a", 1, 20)].into_iter().collect();
    let err = filter_dose(&experiments, &reflections(&[(1, 2.5)]), &dose(1, 5)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InputConsistency);
}
