use super::*;

#[test]
fn test_system_resources_detection() {
    let resources = SystemResources::detect().expect("parallelism is detectable on test hosts");
    assert!(resources.cpu_cores > 0);
    assert_eq!(system_resources().cpu_cores, resources.cpu_cores);
}

#[test]
fn test_optimal_jobs_respects_limit() {
    let resources = SystemResources { cpu_cores: 8 };

    assert_eq!(resources.calculate_optimal_jobs(None), 8);
    assert_eq!(resources.calculate_optimal_jobs(Some(4)), 4);
    assert_eq!(resources.calculate_optimal_jobs(Some(32)), 8);
}

#[test]
fn test_optimal_jobs_never_zero() {
    let resources = SystemResources { cpu_cores: 4 };
    assert_eq!(resources.calculate_optimal_jobs(Some(0)), 1);

    let degenerate = SystemResources { cpu_cores: 0 };
    assert_eq!(degenerate.calculate_optimal_jobs(None), 1);
}
