use super::*;

fn vars(pairs: &[(&str, &str)]) -> EnvironmentConfig {
    envy::from_iter(
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string())),
    )
    .unwrap()
}

#[test]
fn test_no_color() {
    let env = vars(&[("NO_COLOR", "1")]);
    assert_eq!(env.apply_color_config(ColorIntent::Auto), ColorIntent::Never);

    let empty = vars(&[("NO_COLOR", "")]);
    assert_eq!(empty.apply_color_config(ColorIntent::Auto), ColorIntent::Auto);
}

#[test]
fn test_force_color_wins() {
    let env = vars(&[("CLICOLOR", "0"), ("NO_COLOR", "1"), ("FORCE_COLOR", "1")]);
    assert_eq!(env.apply_color_config(ColorIntent::Auto), ColorIntent::Always);

    let off = vars(&[("FORCE_COLOR", "false")]);
    assert_eq!(off.apply_color_config(ColorIntent::Always), ColorIntent::Never);

    let junk = vars(&[("FORCE_COLOR", "maybe")]);
    assert_eq!(junk.apply_color_config(ColorIntent::Auto), ColorIntent::Auto);
}

#[test]
fn test_ci_disables_color_unless_forced() {
    let ci = vars(&[("CI", "true")]);
    assert!(ci.is_ci());
    assert_eq!(ci.apply_color_config(ColorIntent::Auto), ColorIntent::Never);

    let forced = vars(&[("CI", "true"), ("FORCE_COLOR", "3")]);
    assert_eq!(forced.apply_color_config(ColorIntent::Auto), ColorIntent::Always);
}

#[test]
fn test_clicolor() {
    assert_eq!(
        vars(&[("CLICOLOR", "0")]).apply_color_config(ColorIntent::Always),
        ColorIntent::Never
    );
    assert_eq!(
        vars(&[("CLICOLOR", "1")]).apply_color_config(ColorIntent::Auto),
        ColorIntent::Auto
    );
}

#[test]
fn test_unrelated_variables_are_ignored() {
    let env = vars(&[("PATH", "/usr/bin"), ("HOME", "/root")]);
    assert!(!env.is_ci());
    assert_eq!(env.apply_color_config(ColorIntent::Auto), ColorIntent::Auto);
}
