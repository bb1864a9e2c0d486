use easel::Document;
use kurbo::Size;

#[test]
fn json_fixture_validates() {
    let s = include_str!("data/simple_project.json");
    let doc: Document = serde_json::from_str(s).unwrap();
    doc.validate().unwrap();
}

#[test]
fn json_fixture_loads_into_a_scene() {
    let s = include_str!("data/simple_project.json");
    let doc: Document = serde_json::from_str(s).unwrap();

    let (scene, viewport) = easel::from_document(&doc, Size::new(400.0, 400.0)).unwrap();
    assert_eq!(scene.nodes().len(), 3);
    assert_eq!(scene.clip_frame(), Some(easel::NodeId(3)));
    assert!(scene.node(easel::NodeId(3)).unwrap().absolutely_positioned);
    assert_eq!(scene.effects().entries().len(), 2);
    assert!((viewport.zoom - 2.0).abs() < 1e-12);
}
