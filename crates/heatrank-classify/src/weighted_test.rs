use super::*;

/// Analysis with every dimension at `score`, qualifying flags from `flags`
/// (in `DimensionId::ALL` order).
fn analysis(scores: [u8; 8], flags: [bool; 8]) -> WeightedAnalysis {
    WeightedAnalysis {
        dimensions: DimensionId::ALL
            .iter()
            .zip(scores.iter().zip(flags.iter()))
            .map(|(id, (score, qualifies))| DimensionScore {
                dimension: *id,
                score: *score,
                qualifies: *qualifies,
                rationale: String::new(),
            })
            .collect(),
        primary_reason: Some("team shooter".to_owned()),
        suggested_sub_genre: None,
        viewpoint: Viewpoint::FirstPerson,
        pc_availability: Some(PcAvailability::Available),
    }
}

const ALL_TRUE: [bool; 8] = [true; 8];

fn set(a: &mut WeightedAnalysis, id: DimensionId, score: u8, qualifies: bool) {
    let d = a.dimensions.iter_mut().find(|d| d.dimension == id).unwrap();
    d.score = score;
    d.qualifies = qualifies;
}

#[test]
fn weights_sum_to_one() {
    let total: f64 = DimensionId::ALL.iter().map(|d| weight(*d)).sum();
    assert!((total - 1.0).abs() < 1e-9);
}

#[test]
fn top_tier_is_95() {
    let verdict = integrate_decision(&analysis([90; 8], ALL_TRUE));
    assert!(verdict.qualifies);
    assert_eq!(verdict.confidence, 95);
    assert_eq!(verdict.weighted_avg, Some(90));
    assert_eq!(verdict.qualifying_count, Some(8));
    assert_eq!(verdict.source, ClassificationSource::WeightedAi);
}

#[test]
fn second_tier_needs_five_qualifying() {
    // ALL order: shooting, combat, multiplayer, objectives, weapons, competition, platforms, community
    let flags = [true, true, true, false, true, false, true, false];
    let verdict = integrate_decision(&analysis([75; 8], flags));
    assert!(verdict.qualifies);
    assert_eq!(verdict.confidence, 85);
}

#[test]
fn high_average_with_five_qualifying_drops_to_85() {
    let flags = [true, true, true, false, true, false, true, false];
    let verdict = integrate_decision(&analysis([85; 8], flags));
    assert_eq!(verdict.confidence, 85);
}

#[test]
fn third_tier_is_75() {
    let flags = [true, false, true, false, true, false, true, false];
    let verdict = integrate_decision(&analysis([65; 8], flags));
    assert!(verdict.qualifies);
    assert_eq!(verdict.confidence, 75);
}

#[test]
fn strong_core_scores_rescue_at_65() {
    let flags = [true, false, true, false, false, false, true, false];
    let mut a = analysis([40; 8], flags);
    set(&mut a, DimensionId::Shooting, 70, true);
    set(&mut a, DimensionId::Multiplayer, 72, true);
    set(&mut a, DimensionId::Platforms, 90, true);
    let verdict = integrate_decision(&a);
    assert!(verdict.qualifies);
    assert_eq!(verdict.confidence, 65);
}

#[test]
fn weak_scores_with_core_flags_reject_at_60() {
    let flags = [true, false, true, false, false, false, true, false];
    let verdict = integrate_decision(&analysis([50; 8], flags));
    assert!(!verdict.qualifies);
    assert_eq!(verdict.confidence, 60);
    assert!(verdict.sub_genre.is_none());
}

#[test]
fn core_flag_overrides_numeric_score() {
    // Shooting scores 100 but is flagged as not qualifying.
    let mut a = analysis([100; 8], ALL_TRUE);
    set(&mut a, DimensionId::Shooting, 100, false);
    let verdict = integrate_decision(&a);
    assert!(!verdict.qualifies);
    assert_eq!(verdict.confidence, 80);
}

#[test]
fn core_failure_confidence_ordering() {
    let mut platform = analysis([90; 8], ALL_TRUE);
    set(&mut platform, DimensionId::Platforms, 10, false);
    let mut multiplayer = analysis([90; 8], ALL_TRUE);
    set(&mut multiplayer, DimensionId::Multiplayer, 10, false);
    let mut shooting = analysis([90; 8], ALL_TRUE);
    set(&mut shooting, DimensionId::Shooting, 10, false);

    let p = integrate_decision(&platform).confidence;
    let m = integrate_decision(&multiplayer).confidence;
    let s = integrate_decision(&shooting).confidence;
    assert!(p > m && m > s, "expected platform > multiplayer > shooting, got {p} {m} {s}");
}

#[test]
fn several_core_failures_report_platform() {
    let mut a = analysis([20; 8], [false; 8]);
    a.pc_availability = None;
    let verdict = integrate_decision(&a);
    assert!(!verdict.qualifies);
    assert_eq!(verdict.confidence, 90);
}

#[test]
fn exclusive_vetoes_a_top_tier_accept() {
    let mut a = analysis([100; 8], ALL_TRUE);
    a.pc_availability = Some(PcAvailability::Exclusive);
    let verdict = integrate_decision(&a);
    assert!(!verdict.qualifies);
    assert_eq!(verdict.confidence, 95);
}

#[test]
fn unavailable_vetoes_a_core_rejection_too() {
    let mut a = analysis([30; 8], [false; 8]);
    a.pc_availability = Some(PcAvailability::Unavailable);
    let verdict = integrate_decision(&a);
    assert!(!verdict.qualifies);
    assert_eq!(verdict.confidence, 95);
}

#[test]
fn suggested_sub_genre_wins() {
    let mut a = analysis([90; 8], ALL_TRUE);
    a.suggested_sub_genre = Some("arena-shooter".to_owned());
    assert_eq!(integrate_decision(&a).sub_genre.as_deref(), Some("arena-shooter"));
}

#[test]
fn derived_sub_genres() {
    let mut a = analysis([90; 8], ALL_TRUE);
    a.dimensions[3].rationale = "Tactical round-based bomb defusal".to_owned();
    assert_eq!(determine_sub_genre(&a), "tactical-fps");

    a.dimensions[3].rationale = "Capture the flag".to_owned();
    assert_eq!(determine_sub_genre(&a), "competitive-fps");

    set(&mut a, DimensionId::Competition, 50, true);
    assert_eq!(determine_sub_genre(&a), "fps");

    a.viewpoint = Viewpoint::ThirdPerson;
    a.dimensions[3].rationale = "Last squad standing in a battle royale".to_owned();
    assert_eq!(determine_sub_genre(&a), "battle-royale-tps");

    a.viewpoint = Viewpoint::Mixed;
    assert_eq!(determine_sub_genre(&a), "battle-royale");

    a.dimensions[3].rationale.clear();
    a.dimensions[1].rationale = "Hero abilities drive fights".to_owned();
    assert_eq!(determine_sub_genre(&a), "hero-shooter");

    a.dimensions[1].rationale.clear();
    assert_eq!(determine_sub_genre(&a), "pc-shooter");
}

fn full_json(overrides: &str) -> String {
    let dims: Vec<String> = DimensionId::ALL
        .iter()
        .map(|d| {
            format!(
                "\"{}\": {{\"score\": 88, \"reason\": \"r\", \"isShooterLike\": true}}",
                d.as_str()
            )
        })
        .collect();
    format!(
        "{{\"dimensions\": {{{}}}, \"overallAnalysis\": {{\"primaryReason\": \"arena shooter\", \
         \"subGenre\": null, \"perspective\": \"first-person\", \"pcAvailability\": \"{overrides}\"}}}}",
        dims.join(", ")
    )
}

#[test]
fn parses_full_analysis() {
    let a = parse_analysis(&full_json("available")).unwrap();
    assert_eq!(a.dimensions.len(), 8);
    assert_eq!(a.viewpoint, Viewpoint::FirstPerson);
    assert_eq!(a.pc_availability, Some(PcAvailability::Available));
    assert!(a.suggested_sub_genre.is_none());
    assert_eq!(a.primary_reason.as_deref(), Some("arena shooter"));
}

#[test]
fn parsed_exclusive_leads_to_veto() {
    let a = parse_analysis(&full_json("exclusive")).unwrap();
    let verdict = integrate_decision(&a);
    assert!(!verdict.qualifies);
    assert_eq!(verdict.confidence, 95);
}

#[test]
fn missing_dimension_is_malformed() {
    let json = r#"{"dimensions": {"shooting": {"score": 90, "reason": "", "isShooterLike": true}}}"#;
    let err = parse_analysis(json).unwrap_err();
    assert!(matches!(err, StageFailure::Malformed(ref m) if m.contains("combat")));
}

#[test]
fn non_json_is_malformed() {
    assert!(matches!(
        parse_analysis("I think this is a shooter."),
        Err(StageFailure::Malformed(_))
    ));
}

#[test]
fn out_of_range_scores_are_clamped() {
    let json = full_json("available").replace("\"score\": 88", "\"score\": 140");
    let a = parse_analysis(&json).unwrap();
    assert!(a.dimensions.iter().all(|d| d.score == 100));
}
