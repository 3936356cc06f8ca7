use super::*;

#[test]
fn test_join_skips_empty_details() {
    assert_eq!(join("sodium", ""), "sodium");
    assert_eq!(join("sodium", "mc1.20.1-0.5.3"), "sodium: mc1.20.1-0.5.3");
}

#[test]
fn test_status_lines_do_not_panic() {
    let styling = StyleManager::plain();
    let status = StatusDisplay::new(&styling);

    status.success("Downloaded", "");
    status.error("lithium", "not found");
    status.warning("This will erase your mods folder!");
    status.info("No resolution file found");
    status.message("Build finished.");
    status.emphasis("Failed downloads");
    status.subtle("survival.resolved-mods");
    status.section("Statements");
    status.field("Downloads", "12345");
    status.field("Website", "");
}

#[test]
fn test_list_accepts_owned_and_borrowed_items() {
    let styling = StyleManager::plain();
    let status = StatusDisplay::new(&styling);

    status.list(&["game 1.20==1.19.4", "loader quilt"]);
    status.list(&vec!["Sodium".to_string()]);
    status.list::<&str>(&[]);
}

#[test]
fn test_plain_styling_has_no_escape_codes() {
    let styling = StyleManager::plain();

    assert_eq!(styling.format_success("ok"), "+ ok");
    assert_eq!(styling.format_error("bad"), "x bad");
    assert!(!styling.style_emphasis("title").contains('\u{1b}'));
}

#[test]
fn test_forced_color_emits_escape_codes() {
    let styling = StyleManager::new(true);
    assert!(styling.style_success("ok").contains('\u{1b}'));
}
