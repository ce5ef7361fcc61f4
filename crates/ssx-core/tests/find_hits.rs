use polars::prelude::*;

use ssx_core::config::FindHitsParams;
use ssx_core::find_hits::{find_hits, Verdict};
use ssx_core::{ErrorKind, SsxError};
use ssx_model::reflections::{FLAGS_COLUMN, ID_COLUMN, XYZOBS_PX_COLUMNS};
use ssx_model::{Experiment, ExperimentList, Profile, ReflectionFlags, ReflectionTable};

fn experiments(n: usize) -> ExperimentList {
    (0..n).map(|i| Experiment::new(format!("sweep-{i}"))).collect()
}

/// Reflections with the given owners; `x` records the row's original owner so tests can
/// follow a reflection through renumbering.
fn reflections(owners: &[i32], flags: u64) -> ReflectionTable {
    let xyz: Vec<[f64; 3]> = owners
        .iter()
        .enumerate()
        .map(|(row, owner)| [f64::from(*owner), row as f64, 0.5])
        .collect();
    ReflectionTable::from_columns(owners.to_vec(), &xyz, vec![flags; owners.len()]).unwrap()
}

fn counts(spots: &[usize]) -> Vec<i32> {
    spots
        .iter()
        .enumerate()
        .flat_map(|(owner, n)| std::iter::repeat(owner as i32).take(*n))
        .collect()
}

/// One row per `(owner, flags)` pair, frames counting up from 0.5.
fn mixed_table(rows: &[(i32, u64)]) -> ReflectionTable {
    let ids: Vec<i32> = rows.iter().map(|(owner, _)| *owner).collect();
    let flags: Vec<u64> = rows.iter().map(|(_, bits)| *bits).collect();
    let frames: Vec<f64> = (0..rows.len()).map(|row| row as f64 + 0.5).collect();
    let df = df!(
        ID_COLUMN => ids,
        FLAGS_COLUMN => flags,
        XYZOBS_PX_COLUMNS[0] => vec![1024.0f64; rows.len()],
        XYZOBS_PX_COLUMNS[1] => vec![768.0f64; rows.len()],
        XYZOBS_PX_COLUMNS[2] => frames,
    )
    .unwrap();
    ReflectionTable::new(df).unwrap()
}

fn original_owners(table: &ReflectionTable) -> Vec<i32> {
    let ca = table.df().column("xyzobs.px.x").unwrap().f64().unwrap();
    ca.into_iter().map(|x| x.unwrap() as i32).collect()
}

#[test]
fn keeps_only_experiments_inside_spot_range() {
    let params = FindHitsParams {
        minspots: 20,
        maxspots: 100,
        ..FindHitsParams::default()
    };
    let refl = reflections(&counts(&[15, 25, 200]), ReflectionFlags::STRONG.bits());

    let hits = find_hits(&experiments(3), &refl, &params).unwrap();

    assert_eq!(hits.experiments.len(), 1);
    assert_eq!(hits.experiments[0].identifier, "sweep-1");
    assert_eq!(hits.reflections.len(), 25);
    assert!(hits.reflections.ids().unwrap().iter().all(|id| *id == 0));
    assert!(!hits.indexed_only);
    assert_eq!(
        hits.verdicts,
        vec![
            Verdict::TooFewSpots { spots: 15 },
            Verdict::Kept {
                new_position: 0,
                spots: 25
            },
            Verdict::TooManySpots { spots: 200 },
        ]
    );
}

#[test]
fn renumbers_kept_experiments_densely_in_order() {
    let params = FindHitsParams {
        minspots: 2,
        maxspots: 3,
        ..FindHitsParams::default()
    };
    // Rows interleave owners; experiment 1 has a single spot and is rejected.
    let owners = [3, 0, 2, 3, 1, 0, 2, 3, 2];
    let refl = reflections(&owners, 0);

    let hits = find_hits(&experiments(4), &refl, &params).unwrap();

    assert_eq!(hits.experiments.identifiers(), vec!["sweep-0", "sweep-2", "sweep-3"]);
    assert_eq!(hits.reflections.ids().unwrap(), vec![0, 0, 1, 1, 1, 2, 2, 2]);
    assert_eq!(original_owners(&hits.reflections), vec![0, 0, 2, 2, 2, 3, 3, 3]);
    assert!(hits.verdicts.iter().filter(|v| v.is_kept()).count() == 3);
}

#[test]
fn indexed_narrowing_applies_to_every_experiment() {
    let params = FindHitsParams {
        minspots: 20,
        ..FindHitsParams::default()
    };
    let indexed = (ReflectionFlags::INDEXED | ReflectionFlags::STRONG).bits();
    let strong = ReflectionFlags::STRONG.bits();
    let mut rows = vec![(0, strong); 30];
    rows.extend(vec![(1, indexed); 25]);
    rows.extend(vec![(0, indexed); 3]);

    let hits = find_hits(&experiments(2), &mixed_table(&rows), &params).unwrap();

    assert!(hits.indexed_only);
    assert_eq!(hits.verdicts[0], Verdict::TooFewSpots { spots: 3 });
    assert_eq!(hits.experiments.identifiers(), vec!["sweep-1"]);
    assert_eq!(hits.reflections.len(), 25);
    assert_eq!(
        hits.reflections
            .count_flagged(ReflectionFlags::INDEXED)
            .unwrap(),
        25
    );
}

#[test]
fn unassigned_unindexed_rows_are_dropped() {
    let indexed = (ReflectionFlags::INDEXED | ReflectionFlags::STRONG).bits();
    let mut rows: Vec<(i32, u64)> = (0..50).map(|row| (row % 2, indexed)).collect();
    rows.extend(vec![(-1, ReflectionFlags::STRONG.bits()); 10]);

    let hits = find_hits(&experiments(2), &mixed_table(&rows), &FindHitsParams::default()).unwrap();

    assert!(hits.indexed_only);
    assert_eq!(hits.experiments.identifiers(), vec!["sweep-0", "sweep-1"]);
    assert_eq!(hits.reflections.len(), 50);
    assert!(hits.reflections.ids().unwrap().iter().all(|id| *id >= 0));
}

#[test]
fn rejects_high_mosaicity_regardless_of_spots() {
    let mut expts = experiments(2);
    let mosaic = Experiment::new("mosaic").with_profile(Profile {
        sigma_b: 0.02,
        sigma_m: 1.7,
    });
    expts.push(mosaic);
    let refl = reflections(&counts(&[40, 40, 40]), 0);

    let hits = find_hits(&expts, &refl, &FindHitsParams::default()).unwrap();

    assert_eq!(hits.experiments.len(), 2);
    assert_eq!(hits.verdicts[2], Verdict::MosaicityAboveCutoff { sigma_m: 1.7 });
    assert_eq!(hits.reflections.len(), 80);
}

#[test]
fn filtering_is_idempotent() {
    let params = FindHitsParams {
        minspots: 5,
        maxspots: 50,
        ..FindHitsParams::default()
    };
    let refl = reflections(&counts(&[4, 10, 0, 60, 7]), 0);

    let first = find_hits(&experiments(5), &refl, &params).unwrap();
    let second = find_hits(&first.experiments, &first.reflections, &params).unwrap();

    assert_eq!(first.experiments.identifiers(), vec!["sweep-1", "sweep-4"]);
    assert_eq!(second.experiments.identifiers(), first.experiments.identifiers());
    assert_eq!(second.reflections.ids().unwrap(), first.reflections.ids().unwrap());
    assert!(second.verdicts.iter().all(|v| v.is_kept()));
}

#[test]
fn no_hits_is_an_empty_result() {
    let refl = reflections(&counts(&[1, 2]), 0);
    let hits = find_hits(&experiments(2), &refl, &FindHitsParams::default()).unwrap();
    assert!(hits.experiments.is_empty());
    assert!(hits.reflections.is_empty());
    assert_eq!(hits.hit_rate(), 0.0);
}

#[test]
fn dangling_owner_is_an_input_error() {
    let refl = reflections(&[0, 1, 5], 0);
    let err = find_hits(&experiments(2), &refl, &FindHitsParams::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InputConsistency);

    let indexed = ReflectionFlags::INDEXED.bits();
    let refl = mixed_table(&[(0, indexed), (-1, indexed), (1, 0)]);
    let err = find_hits(&experiments(2), &refl, &FindHitsParams::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InputConsistency);
}

#[test]
fn invalid_thresholds_are_configuration_errors() {
    let params = FindHitsParams {
        minspots: 10,
        maxspots: 5,
        ..FindHitsParams::default()
    };
    let refl = reflections(&[0], 0);
    let err = find_hits(&experiments(1), &refl, &params).unwrap_err();
    assert!(matches!(err, SsxError::Config { .. }));
    assert_eq!(err.kind(), ErrorKind::Configuration);
}
