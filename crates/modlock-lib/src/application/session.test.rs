use super::*;
use crate::application::session_mocks::MockInteractiveProvider;

#[test]
fn test_yes_mode_accepts_without_prompting() {
    let provider = LiveInteractiveProvider::new(true);
    assert!(provider.confirm("Continue?", true).unwrap());
    assert!(provider.confirm("Continue?", false).unwrap());
}

#[test]
fn test_mock_records_and_answers() {
    let provider = MockInteractiveProvider::new().with_confirm(false);

    assert!(!provider.confirm("Continue?", true).unwrap());
    assert_eq!(
        provider.get_confirm_calls(),
        vec![("Continue?".to_string(), true)]
    );
}

#[test]
fn test_mock_defaults_and_interrupts() {
    assert!(MockInteractiveProvider::new().confirm("x", true).unwrap());

    let interrupted = MockInteractiveProvider::interrupted();
    assert!(interrupted.confirm("x", true).is_err());
    assert_eq!(interrupted.get_confirm_calls().len(), 1);
}
