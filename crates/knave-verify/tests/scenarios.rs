//! End-to-end verification scenarios over hand-built datasets.

use knave_core::{Answer, CatBlock, Dataset, DomainKind, Metric, NumFeature, Schema};
use knave_perturb::Perturbation;
use knave_verify::{verify, write_reports, VerifyOptions};
use std::collections::BTreeSet;

fn quad_train() -> Dataset {
    Dataset {
        points: vec![
            vec![0.0, 0.0],
            vec![1.0, 0.0],
            vec![0.0, 1.0],
            vec![1.0, 1.0],
        ],
        labels: vec![0, 0, 1, 1],
        classes: vec!["A".into(), "B".into()],
        schema: Schema::numeric(2, 0.0, 1.0),
    }
}

fn line_train() -> Dataset {
    Dataset {
        points: vec![vec![0.0], vec![0.4], vec![0.6], vec![1.0]],
        labels: vec![0, 0, 1, 1],
        classes: vec!["A".into(), "B".into()],
        schema: Schema::numeric(1, 0.0, 1.0),
    }
}

fn test_like(train: &Dataset, points: Vec<Vec<f64>>, labels: Vec<u32>) -> Dataset {
    Dataset {
        points,
        labels,
        classes: train.classes.clone(),
        schema: train.schema.clone(),
    }
}

fn opts(ks: &[usize], domain: DomainKind) -> VerifyOptions {
    VerifyOptions {
        ks: ks.to_vec(),
        metric: Metric::Euclidean,
        domain,
        skip_ties: false,
        jobs: 1,
    }
}

#[test]
fn midpoint_of_one_class_edge_is_stable_and_robust() {
    let train = quad_train();
    let test = test_like(&train, vec![vec![0.5, 0.0]], vec![0]);
    let pert = Perturbation::LInf { epsilon: 0.0 };

    for domain in [DomainKind::Interval, DomainKind::Raf] {
        let v = verify(&train, &test, &[0], &pert, &opts(&[1], domain)).unwrap();
        let kv = &v.points[0].per_k[&1];
        assert_eq!(kv.labels, BTreeSet::from([0]));
        assert_eq!(kv.stable, Answer::Yes);
        assert_eq!(kv.robust, Answer::Yes);
    }
}

#[test]
fn four_way_tie_is_a_definite_instability() {
    let train = quad_train();
    let test = test_like(&train, vec![vec![0.5, 0.5]], vec![0]);
    let pert = Perturbation::LInf { epsilon: 0.0 };

    let v = verify(&train, &test, &[0], &pert, &opts(&[3], DomainKind::Raf)).unwrap();
    let kv = &v.points[0].per_k[&3];
    assert_eq!(kv.labels, BTreeSet::from([0, 1]));
    // The unperturbed classification already ties, so this is a genuine No,
    // not an artifact of abstraction.
    assert_eq!(kv.stable, Answer::No);
    assert_eq!(kv.robust, Answer::No);
}

#[test]
fn symmetric_neighbours_stay_undecided_as_epsilon_shrinks() {
    let train = line_train();
    let test = test_like(&train, vec![vec![0.5]], vec![0]);

    for eps in [0.05, 0.04] {
        let pert = Perturbation::LInf { epsilon: eps };
        let v = verify(&train, &test, &[0], &pert, &opts(&[1], DomainKind::Raf)).unwrap();
        let kv = &v.points[0].per_k[&1];
        assert_eq!(kv.labels, BTreeSet::from([0, 1]), "eps={eps}");
    }
}

#[test]
fn tight_region_around_an_off_center_point_separates() {
    let train = line_train();
    let test = test_like(&train, vec![vec![0.48]], vec![0]);

    // Wide region: incomparable distances, undecided.
    let wide = Perturbation::LInf { epsilon: 0.05 };
    let v = verify(&train, &test, &[0], &wide, &opts(&[1], DomainKind::Raf)).unwrap();
    assert_eq!(v.points[0].per_k[&1].stable, Answer::DontKnow);

    // Tight region: the nearer neighbour strictly dominates, stable.
    let tight = Perturbation::LInf { epsilon: 0.01 };
    let v = verify(&train, &test, &[0], &tight, &opts(&[1], DomainKind::Raf)).unwrap();
    let kv = &v.points[0].per_k[&1];
    assert_eq!(kv.labels, BTreeSet::from([0]));
    assert_eq!(kv.stable, Answer::Yes);
    assert_eq!(kv.robust, Answer::Yes);
}

#[test]
fn categorical_noise_unions_the_per_setting_winners() {
    // One binary categorical column plus one numeric column; flipping the
    // categorical bit flips the nearest neighbour.
    let train = Dataset {
        points: vec![vec![0.0, 0.5], vec![1.0, 0.5]],
        labels: vec![0, 1],
        classes: vec!["A".into(), "B".into()],
        schema: Schema {
            cat_blocks: vec![CatBlock {
                start: 0,
                width: 1,
                levels: vec!["no".into(), "yes".into()],
            }],
            num_features: vec![NumFeature {
                index: 1,
                lo: 0.0,
                hi: 1.0,
            }],
        },
    };
    let test = test_like(&train, vec![vec![0.0, 0.5]], vec![0]);
    let pert = Perturbation::NoiseCat {
        noise: Box::new(Perturbation::LInf { epsilon: 0.0 }),
        cat_on: vec![0],
    };

    let v = verify(&train, &test, &[0], &pert, &opts(&[1], DomainKind::Raf)).unwrap();
    let kv = &v.points[0].per_k[&1];
    // Each enumerated setting classifies uniquely; their union is reported.
    assert_eq!(kv.labels, BTreeSet::from([0, 1]));
    assert_eq!(kv.stable, Answer::DontKnow);
}

#[test]
fn full_pipeline_writes_the_result_tree() {
    let train = line_train();
    let test = test_like(
        &train,
        vec![vec![0.1], vec![0.48], vec![0.9]],
        vec![0, 0, 1],
    );
    let pert = Perturbation::LInf { epsilon: 0.01 };
    let v = verify(&train, &test, &[0, 1, 2], &pert, &opts(&[1, 3], DomainKind::Raf)).unwrap();

    assert_eq!(v.points.len(), 3);
    assert_eq!(v.stability[&1].total(), 3);

    let mut dir = std::env::temp_dir();
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    dir.push(format!("knave_e2e_{nanos}"));

    let config = serde_json::json!({"k": [1, 3], "perturbation": {"kind": "l_inf", "epsilon": 0.01}});
    write_reports(&dir, &config, &train.classes, &v).unwrap();
    assert!(dir.join("k=1").join("details.csv").exists());
    assert!(dir.join("k=3").join("details.csv").exists());
    assert!(dir.join("stability.csv").exists());
    let _ = std::fs::remove_dir_all(dir);
}
