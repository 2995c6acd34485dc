use super::*;
use crate::scene::model::ContentKind;

#[test]
fn page_numbers_are_dense_and_one_based() {
    let mut b = SceneBuilder::new("Issue #1");
    assert_eq!(b.push_page(PageBuilder::new().target_image("a.png")).unwrap(), 1);
    assert_eq!(b.push_page(PageBuilder::new().target_image("b.png")).unwrap(), 2);
    let (_, pages) = b.build().unwrap();
    assert_eq!(
        pages.iter().map(|p| p.page_number).collect::<Vec<_>>(),
        vec![1, 2]
    );
    assert!(pages.iter().all(|p| p.id.is_some()));
}

#[test]
fn page_without_target_is_rejected() {
    let mut b = SceneBuilder::new("x");
    assert!(b.push_page(PageBuilder::new()).is_err());
    assert!(b.push_page(PageBuilder::new().target_image("  ")).is_err());
    assert!(b.pages().is_empty());
}

#[test]
fn later_content_replaces_earlier() {
    let mut b = SceneBuilder::new("x");
    b.push_page(
        PageBuilder::new()
            .target_image("a.png")
            .content(OverlayContent::new(ContentKind::Image, "i.png"))
            .content(OverlayContent::new(ContentKind::Video, "v.mp4")),
    )
    .unwrap();
    assert_eq!(
        b.pages()[0].content.as_ref().unwrap().kind,
        ContentKind::Video
    );
}

#[test]
fn remove_keeps_existing_numbers_and_next_append_uses_count() {
    let mut b = SceneBuilder::new("x");
    b.push_page(PageBuilder::new().target_image("a.png")).unwrap();
    b.push_page(PageBuilder::new().target_image("b.png")).unwrap();
    let first = b.pages()[0].id.clone().unwrap();
    assert!(b.remove_page(&first));
    assert!(!b.remove_page(&first));
    assert_eq!(b.pages()[0].page_number, 2);
    assert_eq!(b.push_page(PageBuilder::new().target_image("c.png")).unwrap(), 2);
}

#[test]
fn empty_builder_does_not_build() {
    assert!(SceneBuilder::new("x").build().is_err());
}
