use scrollyte::{Scene, ScrollPipeline, ScrollSample};

fn fixture() -> Scene {
    let s = include_str!("data/scene.json");
    serde_json::from_str(s).unwrap()
}

#[test]
fn fixture_parses_and_validates() {
    let scene = fixture();
    scene.validate().unwrap();

    assert_eq!(scene.viewport_h, 800.0);
    assert_eq!(scene.end_anchor.top, 5000.0);
    assert_eq!(scene.sequence.frame_count, 240);
    assert_eq!(scene.handoff_image.as_deref(), Some("images/can.png"));

    // Omitted handoff fields fall back to the defaults.
    assert_eq!(scene.handoff.fall_end, 0.82);
    assert_eq!(scene.handoff.hysteresis, 600.0);
}

#[test]
fn fixture_roundtrips_through_serde() {
    let scene = fixture();
    let s = serde_json::to_string_pretty(&scene).unwrap();
    let de: Scene = serde_json::from_str(&s).unwrap();
    assert_eq!(de.start_anchor, scene.start_anchor);
    assert_eq!(de.sequence.background_rgba, [251, 246, 246, 255]);
}

#[test]
fn fixture_drives_a_pipeline_to_the_worked_example_range() {
    let scene = fixture();
    let mut pipeline = ScrollPipeline::new(scene.handoff.clone()).unwrap();
    let parked = ScrollSample::new(0.0, 0.0, scene.viewport_w, scene.viewport_h);
    pipeline
        .end_anchor_established(scene.end_anchor, parked)
        .unwrap();

    let range = pipeline.trigger().unwrap();
    assert_eq!(range.start, 3756.0);
    assert_eq!(range.end, 4856.0);
}

#[test]
fn validation_rejects_broken_documents() {
    let mut scene = fixture();
    scene.viewport_h = 0.0;
    assert!(scene.validate().is_err());

    let mut scene = fixture();
    scene.handoff.travel_distance = -10.0;
    assert!(scene.validate().is_err());

    let mut scene = fixture();
    scene.sequence.frame_count = 0;
    assert!(scene.validate().is_err());

    let mut scene = fixture();
    scene.start_anchor.width = -1.0;
    assert!(scene.validate().is_err());
}
