use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use scripture_corpora::config::{Config, CONFIG_FILE};
use scripture_corpora::error::Error;
use scripture_corpora::pipelines::{Pipeline, Preprocess, SCORES_FILE, STATS_FILE, VREF_FILE};

const NB_VERSES: usize = 60;

fn lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(String::from)
        .collect()
}

/// GEN 1:1-30 then MAT 1:1-30, and three translations.
fn write_data(data_dir: &Path) {
    fs::create_dir_all(data_dir).unwrap();
    let vrefs: Vec<String> = (0..NB_VERSES)
        .map(|i| match i {
            i if i < 30 => format!("GEN 1:{}", i + 1),
            i => format!("MAT 1:{}", i - 29),
        })
        .collect();
    fs::write(data_dir.join(VREF_FILE), vrefs.join("\n")).unwrap();
    for project in ["en-WEB", "de-LU", "de-ELB"] {
        let text: Vec<String> = (0..NB_VERSES)
            .map(|i| format!("{} verse {}", project, i))
            .collect();
        fs::write(data_dir.join(format!("{}.txt", project)), text.join("\n")).unwrap();
    }
}

fn write_config(exp_dir: &Path, config: &str) {
    fs::create_dir_all(exp_dir).unwrap();
    fs::write(exp_dir.join(CONFIG_FILE), config).unwrap();
}

#[test_log::test]
fn full_run() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("data");
    let exp_dir = dir.path().join("exp");
    write_data(&data_dir);
    write_config(
        &exp_dir,
        "
data:
  corpus_pairs:
    - src: en-WEB
      trg: de-LU
      test_size: 10
      val_size: 10
    - src: en-WEB
      trg: de-ELB
      type: test
      test_size: 10
  seed: 42
eval:
  multi_ref_eval: true
",
    );

    let config = Config::load(&exp_dir).unwrap();
    let sizes = Preprocess::new(config, data_dir, None, false).run().unwrap();
    assert_eq!(sizes.train, 40);
    assert_eq!(sizes.val, 10);
    assert_eq!(sizes.test, 10);

    let train_src = lines(&exp_dir.join("train.src.txt"));
    let train_trg = lines(&exp_dir.join("train.trg.txt"));
    assert_eq!(train_src.len(), 40);
    assert_eq!(train_trg.len(), 40);
    assert!(train_src.iter().all(|l| l.starts_with("en-WEB verse ")));
    assert!(train_trg.iter().all(|l| l.starts_with("de-LU verse ")));

    assert_eq!(lines(&exp_dir.join("val.src.txt")).len(), 10);
    assert_eq!(lines(&exp_dir.join("val.trg.txt.0")).len(), 10);

    // both translations are references of the same verses
    let test_src = lines(&exp_dir.join("test.src.txt"));
    let test_lu = lines(&exp_dir.join("test.trg.LU.txt"));
    let test_elb = lines(&exp_dir.join("test.trg.ELB.txt"));
    assert_eq!(lines(&exp_dir.join("test.vref.txt")).len(), 10);
    assert_eq!(test_src.len(), 10);
    for ((src, lu), elb) in test_src.iter().zip(&test_lu).zip(&test_elb) {
        let verse = src.trim_start_matches("en-WEB verse ");
        assert_eq!(lu, &format!("de-LU verse {}", verse));
        assert_eq!(elb, &format!("de-ELB verse {}", verse));
    }

    // no held out verse is trained on
    let held_out: BTreeSet<String> = test_src
        .into_iter()
        .chain(lines(&exp_dir.join("val.src.txt")))
        .collect();
    assert_eq!(held_out.len(), 20);
    assert!(train_src.iter().all(|l| !held_out.contains(l)));
    assert!(!exp_dir.join("WEB_LU.csv").exists());
}

#[test]
fn reruns_are_reproducible() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("data");
    write_data(&data_dir);
    let config = "data: {corpus_pairs: [{src: en-WEB, trg: de-LU, test_size: 5, val_size: 5}]}";
    let mut tests = Vec::new();
    for name in ["exp1", "exp2"] {
        let exp_dir = dir.path().join(name);
        write_config(&exp_dir, config);
        let config = Config::load(&exp_dir).unwrap();
        Preprocess::new(config, data_dir.clone(), None, false)
            .run()
            .unwrap();
        tests.push(lines(&exp_dir.join("test.vref.txt")));
    }
    assert_eq!(tests[0], tests[1]);
}

#[test_log::test]
fn scores_and_stats() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("data");
    let exp_dir = dir.path().join("exp");
    let scores_dir = dir.path().join("scores");
    write_data(&data_dir);
    write_config(
        &exp_dir,
        "data: {corpus_pairs: [{src: en-WEB, trg: de-LU, test_size: 10, val_size: 10}], score_threshold: 5}",
    );
    let pair_dir = scores_dir.join("en-WEB").join("de-LU");
    fs::create_dir_all(&pair_dir).unwrap();
    let scores: Vec<String> = (0..NB_VERSES)
        .map(|i| format!("{:.4}", i as f64 / NB_VERSES as f64))
        .collect();
    fs::write(pair_dir.join(SCORES_FILE), scores.join("\n")).unwrap();

    let config = Config::load(&exp_dir).unwrap();
    let sizes = Preprocess::new(config, data_dir, Some(scores_dir), true)
        .run()
        .unwrap();
    assert_eq!(sizes.train, 35);

    let stats = lines(&exp_dir.join(STATS_FILE));
    assert_eq!(stats.len(), 2);
    assert!(stats[1].starts_with("WEB,LU,60,"));
    let fields: Vec<&str> = stats[1].split(',').collect();
    assert_eq!(fields[4], "5");

    // the training pool is dumped before any split, with its scores
    let pool = lines(&exp_dir.join("WEB_LU.csv"));
    assert_eq!(pool.len(), NB_VERSES + 1);
    assert_eq!(pool[0], "index,vref,source,target,score");
    assert_eq!(pool[1], "0,GEN 1:1,en-WEB verse 0,de-LU verse 0,0.0");
    assert_eq!(pool[60], "59,MAT 1:30,en-WEB verse 59,de-LU verse 59,0.9833");
}

#[test]
fn missing_scores() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("data");
    let exp_dir = dir.path().join("exp");
    write_data(&data_dir);
    write_config(
        &exp_dir,
        "data: {corpus_pairs: [{src: en-WEB, trg: de-LU}], score_threshold: 0.5}",
    );
    let config = Config::load(&exp_dir).unwrap();
    let result = Preprocess::new(config, data_dir, Some(dir.path().join("scores")), false).run();
    assert!(matches!(result, Err(Error::Io(_))));
}
