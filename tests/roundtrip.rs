//! End-to-end encode → decode → score scenarios.

use mapscript::codec::{Completion, Decoder, Encoder};
use mapscript::config::CodecConfig;
use mapscript::memory::{ItemMemory, MemoryBank, MemoryCategory};
use mapscript::script::{RandomScriptBuilder, RandomScriptConfig, Role, RoleLabel, Script, Step, Synset};
use mapscript::scoring::{script_similarity, FidelityReport, ScoreOptions};
use mapscript::vsa::Algebra;
use mapscript::VsaError;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::tempdir;

fn config(seed: u64) -> CodecConfig {
    CodecConfig {
        dim: 1000,
        seed: Some(seed),
        ..Default::default()
    }
}

fn random_script(seed: u64, steps: usize, roles: usize, fillers: (usize, usize)) -> Script {
    let mut builder = RandomScriptBuilder::new(
        seed,
        RandomScriptConfig {
            steps: (steps, steps),
            roles: (roles, roles),
            fillers,
            ..Default::default()
        },
    );
    builder.build("Restaurant")
}

fn linear_script(name: &str, steps: usize) -> Script {
    let roles = |i: usize| {
        vec![
            Role::new(RoleLabel::Arg0, vec![Synset::single("people", 0)]),
            Role::new(
                RoleLabel::Arg1,
                vec![Synset::single(&format!("dish{}", i), 0)],
            ),
        ]
    };
    let steps = (0..steps)
        .map(|i| Step::new(Synset::single(&format!("act{}", i), 0), roles(i)))
        .collect();
    Script::single(name, steps)
}

#[test]
fn test_roundtrip_recovers_actions_labels_and_fillers() {
    for seed in 0..5 {
        let mut bank = MemoryBank::new(&config(seed)).unwrap();
        let script = random_script(seed, 3, 2, (1, 3));
        Encoder::new(&mut bank).encode_script(&script).unwrap();

        let name = format!("{}:0", script.name);
        let decoded = Decoder::new(&bank).decode_script(&name, false).unwrap();
        let reference = &script.significances[0];
        assert_eq!(decoded.steps.len(), 3, "seed {}", seed);
        assert_eq!(decoded.completion, Completion::Ended { at: 3 });

        let synsets = bank.memory(MemoryCategory::Synsets);
        for (r, d) in reference.steps.iter().zip(&decoded.steps) {
            assert_eq!(d.action.key, r.action.key());
            let cached = synsets.get(&r.action.key()).unwrap();
            assert_eq!(d.action.vector.similarity(cached).unwrap(), 1.0);

            let labels: Vec<RoleLabel> = d.roles.iter().map(|role| role.label).collect();
            let expected: Vec<RoleLabel> = r.roles.iter().map(|role| role.label).collect();
            assert_eq!(labels, expected, "seed {}", seed);
        }

        let report = FidelityReport::compute(reference, &decoded.to_significance());
        assert_eq!(report.action_match, 1.0);
        assert_eq!(report.role_match, 1.0);
        assert!(report.filler_match >= 0.9, "seed {}: {:?}", seed, report);
    }
}

#[test]
fn test_end_detected_after_five_steps() {
    let mut bank = MemoryBank::new(&config(3)).unwrap();
    let script = random_script(3, 5, 2, (1, 2));
    Encoder::new(&mut bank).encode_script(&script).unwrap();

    let decoded = Decoder::new(&bank)
        .decode_script("Restaurant-0:0", false)
        .unwrap();
    assert_eq!(decoded.steps.len(), 5);
    assert_eq!(decoded.completion, Completion::Ended { at: 5 });
    assert!(decoded.is_complete());
}

#[test]
fn test_item_memory_duplicate_policy() {
    let algebra = Algebra::new(256).unwrap();
    let mut rng = StdRng::seed_from_u64(1);
    let mut memory = ItemMemory::new("Words", 256);

    let first = memory.get_or_create("menu", &algebra, &mut rng).unwrap();
    let again = memory.get_or_create("menu", &algebra, &mut rng).unwrap();
    assert_eq!(first, again);

    let other = algebra.generate(&mut rng);
    assert!(matches!(
        memory.set("menu", other),
        Err(VsaError::DuplicateKey { .. })
    ));
    assert_eq!(memory.get("menu").unwrap(), &first);
    assert!(matches!(
        memory.get("wine"),
        Err(VsaError::NotFound { .. })
    ));
}

#[test]
fn test_reencoding_changes_nothing() {
    let mut bank = MemoryBank::new(&config(9)).unwrap();
    let script = random_script(9, 3, 2, (1, 3));
    let first = Encoder::new(&mut bank).encode_script(&script).unwrap();
    let sizes = bank.sizes();
    let second = Encoder::new(&mut bank).encode_script(&script).unwrap();
    assert_eq!(first, second);
    assert_eq!(bank.sizes(), sizes);
}

#[test]
fn test_iteration_cap_truncates() {
    let mut bank = MemoryBank::new(&CodecConfig {
        max_iterations: 3,
        ..config(4)
    })
    .unwrap();
    Encoder::new(&mut bank)
        .encode_script(&linear_script("Long", 20))
        .unwrap();

    let decoder = Decoder::new(&bank);
    let decoded = decoder.decode_script("Long:0", false).unwrap();
    assert_eq!(decoded.steps.len(), 3);
    assert_eq!(decoded.completion, Completion::CapReached);
    assert!(!decoded.is_complete());

    match decoder.decode_strict("Long:0", false) {
        Err(VsaError::IterationCapExceeded { level, cap }) => {
            assert_eq!(level, "step");
            assert_eq!(cap, 3);
        }
        other => panic!("expected IterationCapExceeded, got {:?}", other.map(|d| d.name)),
    }
}

#[test]
fn test_strict_decode_accepts_complete_scripts() {
    let mut bank = MemoryBank::new(&config(5)).unwrap();
    Encoder::new(&mut bank)
        .encode_script(&linear_script("Short", 4))
        .unwrap();
    let decoded = Decoder::new(&bank).decode_strict("Short:0", false).unwrap();
    assert_eq!(decoded.steps.len(), 4);
    assert_eq!(decoded.steps[2].action.key, "act2:0");
}

#[test]
fn test_saved_bank_decodes_identically() {
    let mut bank = MemoryBank::new(&config(6)).unwrap();
    let script = random_script(6, 3, 2, (1, 3));
    Encoder::new(&mut bank).encode_script(&script).unwrap();

    let dir = tempdir().unwrap();
    let path = dir.path().join("bank.bin");
    bank.save(&path).unwrap();
    let restored = MemoryBank::load(&path).unwrap();

    let name = format!("{}:0", script.name);
    let before = Decoder::new(&bank).decode_script(&name, false).unwrap();
    let after = Decoder::new(&restored).decode_script(&name, false).unwrap();
    assert_eq!(before.to_significance(), after.to_significance());
    assert_eq!(before.vector, after.vector);
}

#[test]
fn test_self_score_is_one() {
    let script = random_script(8, 4, 3, (1, 3));
    let reference = &script.significances[0];
    for options in [
        ScoreOptions::default(),
        ScoreOptions {
            check_role: true,
            check_synset: false,
        },
        ScoreOptions::strict(),
    ] {
        assert_eq!(script_similarity(reference, reference, options), 1.0);
    }
}

#[test]
fn test_clean_decode_scores_high() {
    let mut bank = MemoryBank::new(&config(12)).unwrap();
    let script = random_script(12, 3, 2, (1, 2));
    Encoder::new(&mut bank).encode_script(&script).unwrap();
    let name = format!("{}:0", script.name);

    let decoded = Decoder::new(&bank).decode_script(&name, false).unwrap();
    let score = script_similarity(
        &script.significances[0],
        &decoded.to_significance(),
        ScoreOptions::strict(),
    );
    assert!(score > 0.9, "score {}", score);
    assert!(decoded.confidence > 0.0 && decoded.confidence <= 1.0);
}

#[test]
fn test_noisy_decode_keeps_step_count() {
    let mut bank = MemoryBank::new(&config(13)).unwrap();
    let script = random_script(13, 3, 2, (1, 1));
    Encoder::new(&mut bank).encode_script(&script).unwrap();
    let name = format!("{}:0", script.name);

    let decoded = Decoder::new(&bank).decode_script(&name, true).unwrap();
    assert_eq!(decoded.steps.len(), 3);
    for (r, d) in script.significances[0].steps.iter().zip(&decoded.steps) {
        assert_eq!(d.action.key, r.action.key());
    }
}

#[test]
fn test_decoded_words_spell_back() {
    let mut bank = MemoryBank::new(&config(14)).unwrap();
    let script = random_script(14, 2, 1, (1, 1));
    let mut encoder = Encoder::new(&mut bank);
    encoder.encode_script(&script).unwrap();
    for word in script.significances[0].steps.iter().map(|s| &s.action.lemma) {
        assert!((encoder.spell_similarity(word).unwrap() - 1.0).abs() < 1e-9);
    }
}

#[test]
fn test_senses_of_one_lemma_roundtrip() {
    let mut bank = MemoryBank::new(&config(15)).unwrap();
    let script = Script::single(
        "Bistro",
        vec![
            Step::new(
                Synset::single("order", 0),
                vec![
                    Role::new(RoleLabel::Arg0, vec![Synset::single("guest", 0)]),
                    Role::new(RoleLabel::Arg1, vec![Synset::single("wine", 0)]),
                ],
            ),
            Step::new(
                Synset::single("order", 1),
                vec![Role::new(
                    RoleLabel::Arg1,
                    vec![Synset::single("wine", 1), Synset::single("bread", 0)],
                )],
            ),
            Step::new(
                Synset::single("order", 2),
                vec![Role::new(RoleLabel::Arg0, vec![Synset::single("guest", 1)])],
            ),
        ],
    );
    Encoder::new(&mut bank).encode_script(&script).unwrap();

    let synsets = bank.memory(MemoryCategory::Synsets);
    let first = synsets.get("order:0").unwrap();
    let second = synsets.get("order:1").unwrap();
    assert!(first.similarity(second).unwrap().abs() < 0.2);

    let decoded = Decoder::new(&bank).decode_script("Bistro:0", false).unwrap();
    let actions: Vec<&str> = decoded.steps.iter().map(|s| s.action.key.as_str()).collect();
    assert_eq!(actions, vec!["order:0", "order:1", "order:2"]);

    let mut fillers: Vec<String> = decoded.steps[1].roles[0]
        .fillers
        .iter()
        .map(|f| f.key.clone())
        .collect();
    fillers.sort();
    assert_eq!(fillers, vec!["bread:0", "wine:1"]);

    let report = FidelityReport::compute(&script.significances[0], &decoded.to_significance());
    assert_eq!(report.action_match, 1.0);
    assert_eq!(report.filler_match, 1.0);
}

#[test]
fn test_repeated_role_label_rejected_before_encoding() {
    let mut bank = MemoryBank::new(&config(16)).unwrap();
    let sizes = bank.sizes();
    let script = Script::single(
        "Diner",
        vec![Step::new(
            Synset::single("eat", 0),
            vec![
                Role::new(RoleLabel::ArgmTmp, vec![Synset::single("morning", 0)]),
                Role::new(RoleLabel::ArgmTmp, vec![Synset::single("evening", 0)]),
            ],
        )],
    );
    assert!(matches!(
        Encoder::new(&mut bank).encode_script(&script),
        Err(VsaError::InvalidScript(_))
    ));
    assert_eq!(bank.sizes(), sizes);
}
