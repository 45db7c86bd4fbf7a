use super::*;
use std::io::Cursor;

const TRACE: &str = "\
0.000;0.010;f1;innocent;512;100
0.001;0.011;f1;innocent;512;100
0.002;0.012;f2;innocent;1024;200
0.003;0.013;f3;innocent;1024;200
";

fn bounds() -> AttackBounds {
    AttackBounds {
        max_attack_job_size_ns: 1000.0,
        min_attack_packet_size_bits: 8192,
    }
}

fn analysis() -> TraceAnalysis {
    analyze_reader(Cursor::new(TRACE), &Policy::ALL, bounds()).unwrap()
}

#[test]
fn test_policy_names_round_trip() {
    for policy in Policy::ALL {
        assert_eq!(policy.name().parse::<Policy>().unwrap(), policy);
        assert_eq!(policy.to_string(), policy.name());
    }
}

#[test]
fn test_unsupported_policy_is_rejected() {
    for name in ["lifo", "SJF", "wsjf-inorder", ""] {
        assert!(matches!(
            name.parse::<Policy>(),
            Err(AnalyzerError::UnsupportedPolicy(_))
        ));
    }
}

#[test]
fn test_one_pass_builds_every_requested_analyzer() {
    let analysis = analysis();
    assert_eq!(analysis.analyzers.len(), Policy::ALL.len());
    for policy in Policy::ALL {
        let analyzer = analysis.analyzer(policy).unwrap();
        assert_eq!(analyzer.policy(), policy);
        assert_eq!(analyzer.statistics(), &analysis.summary.statistics);
    }
}

#[test]
fn test_subset_of_policies() {
    let analysis = analyze_reader(Cursor::new(TRACE), &[Policy::Sjf], bounds()).unwrap();
    assert_eq!(analysis.analyzers.len(), 1);
    assert!(analysis.analyzer(Policy::Fcfs).is_none());
}

#[test]
fn test_no_attack_leaves_goodput_untouched() {
    let analysis = analysis();
    let rates = Rates::new(1.0, 0.0);

    for analyzer in &analysis.analyzers {
        let strategy = analyzer.compute_optimal_strategy(&rates);
        assert_eq!(strategy.expected_displacement, 0.0, "{}", analyzer.policy());
        assert!(
            (strategy.expected_goodput_gbps - 1.0).abs() < 1e-12,
            "{}: {}",
            analyzer.policy(),
            strategy.expected_goodput_gbps
        );
    }
}

#[test]
fn test_sjf_without_attack_uses_largest_job() {
    let analysis = analysis();
    let strategy = analysis
        .analyzer(Policy::Sjf)
        .unwrap()
        .compute_optimal_strategy(&Rates::new(1.0, 0.0));

    assert_eq!(strategy.estimated_job_size_ns, 200.0);
    assert_eq!(strategy.actual_job_size_ns, 200.0);
    assert_eq!(strategy.packet_size_bits, 512);
}

#[test]
fn test_overwhelming_attack_starves_job_size_policies() {
    let analysis = analysis();
    let rates = Rates::new(1.0, 100.0);

    for policy in [Policy::Sjf, Policy::SjfInorder] {
        let strategy = analysis
            .analyzer(policy)
            .unwrap()
            .compute_optimal_strategy(&rates);
        // Saturates at the smallest key, so the attack job sits just below it
        assert_eq!(strategy.actual_job_size_ns, 99.0, "{policy}");
        assert_eq!(strategy.expected_goodput_gbps, 0.0, "{policy}");
        assert!((strategy.expected_displacement - 0.01).abs() < 1e-12, "{policy}");
    }
}

#[test]
fn test_overwhelming_attack_starves_ratio_policies() {
    let analysis = analysis();
    let rates = Rates::new(1.0, 10.0);

    for policy in [Policy::Wsjf, Policy::WsjfInorder] {
        let strategy = analysis
            .analyzer(policy)
            .unwrap()
            .compute_optimal_strategy(&rates);
        assert_eq!(strategy.expected_goodput_gbps, 0.0, "{policy}");
        assert!((strategy.expected_displacement - 0.1).abs() < 1e-12, "{policy}");
        assert!(strategy.packet_size_bits >= 8192, "{policy}");
        assert!(
            strategy.actual_job_size_ns / (strategy.packet_size_bits as f64) < 0.1,
            "{policy}"
        );
    }
}

#[test]
fn test_unsaturated_ratio_uses_last_scanned_slot() {
    let analysis = analysis();
    for policy in [Policy::Wsjf, Policy::WsjfInorder] {
        let strategy = analysis
            .analyzer(policy)
            .unwrap()
            .compute_optimal_strategy(&Rates::new(1.0, 0.0));

        // Last slot is 800 / 4096 = 25 / 128, scaled up to an 8192-bit packet
        assert_eq!(strategy.packet_size_bits, 8192, "{policy}");
        assert_eq!(strategy.actual_job_size_ns, 1600.0, "{policy}");
    }
}

#[test]
fn test_unsaturated_ratio_attack_stays_within_capacity() {
    let trace = "0;1;f1;innocent;1024;100
1;2;f2;innocent;1024;200
";
    let analysis = analyze_reader(
        Cursor::new(trace),
        &[Policy::Wsjf, Policy::WsjfInorder],
        bounds(),
    )
    .unwrap();
    let stats = &analysis.summary.statistics;
    let rates = Rates::new(1.0, 2.5);

    for analyzer in &analysis.analyzers {
        let strategy = analyzer.compute_optimal_strategy(&rates);
        assert_eq!(strategy.actual_job_size_ns, 1600.0, "{}", analyzer.policy());
        assert_eq!(strategy.packet_size_bits, 8192, "{}", analyzer.policy());
        assert!((strategy.expected_goodput_gbps - 1.0).abs() < 1e-12);

        let innocent = (rates.innocent_gbps / stats.average_packet_size() as f64)
            * stats.average_job_size();
        let attack =
            rates.attack_gbps * strategy.actual_job_size_ns / strategy.packet_size_bits as f64;
        assert!(innocent + attack < 1.0, "{}: {}", analyzer.policy(), innocent + attack);
    }
}

#[test]
fn test_fcfs_matches_closed_form() {
    let analysis = analysis();
    let analyzer = analysis.analyzer(Policy::Fcfs).unwrap();

    for (r_i, r_a) in [(1.0, 1.0), (2.0, 0.5), (0.5, 4.0)] {
        let strategy = analyzer.compute_optimal_strategy(&Rates::new(r_i, r_a));
        let innocent = (r_i / 768.0) * 150.0;
        let adversarial = (r_a / 512.0) * 1000.0;
        let expected = r_i * (1.0 / (innocent + adversarial)).min(1.0);

        assert!((strategy.expected_goodput_gbps - expected).abs() < 1e-12);
        assert_eq!(strategy.actual_job_size_ns, 1000.0);
        assert_eq!(strategy.packet_size_bits, 512);
    }
}

#[test]
fn test_fq_counts_distinct_flows() {
    let analysis = analysis();
    match analysis.analyzer(Policy::Fq).unwrap() {
        PolicyAnalyzer::Fq(fq) => assert_eq!(fq.flow_count(), 3),
        other => panic!("unexpected analyzer {:?}", other.policy()),
    }
}

#[test]
fn test_goodput_and_displacement_bounds_hold_over_rate_grid() {
    let analysis = analysis();
    let r_max = analysis.summary.statistics.r_max();
    let grid = [0.0, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 40.0];

    for analyzer in &analysis.analyzers {
        for &r_i in &grid[1..] {
            for &r_a in &grid {
                let s = analyzer.compute_optimal_strategy(&Rates::new(r_i, r_a));
                let label = format!("{} r_I={r_i} r_A={r_a}", analyzer.policy());
                assert!(s.expected_displacement >= 0.0, "{label}");
                assert!(s.expected_goodput_gbps >= 0.0, "{label}");
                assert!(s.expected_goodput_gbps <= r_i + 1e-12, "{label}");
                assert!(s.expected_goodput_gbps <= r_max + 1e-12, "{label}");
            }
        }
    }
}

#[test]
fn test_strategies_are_deterministic() {
    let first = analysis();
    let second = analysis();
    let rates = Rates::new(3.0, 0.7);

    for (a, b) in first.analyzers.iter().zip(&second.analyzers) {
        let x = a.compute_optimal_strategy(&rates);
        let y = b.compute_optimal_strategy(&rates);
        assert_eq!(
            x.expected_goodput_gbps.to_bits(),
            y.expected_goodput_gbps.to_bits()
        );
        assert_eq!(
            x.expected_displacement.to_bits(),
            y.expected_displacement.to_bits()
        );
        assert_eq!(x, y);
        // Repeated queries against one analyzer agree as well
        assert_eq!(a.compute_optimal_strategy(&rates), x);
    }
}

#[test]
fn test_profiles_are_non_decreasing() {
    let analysis = analysis();
    for analyzer in &analysis.analyzers {
        match analyzer {
            PolicyAnalyzer::Sjf(a) => assert_monotonic(a.profile().points().iter().map(|p| p.1)),
            PolicyAnalyzer::SjfInorder(a) => {
                assert_monotonic(a.profile().points().iter().map(|p| p.1))
            }
            PolicyAnalyzer::Wsjf(a) => assert_monotonic(a.profile().slots().iter().copied()),
            PolicyAnalyzer::WsjfInorder(a) => {
                assert_monotonic(a.profile().slots().iter().copied())
            }
            PolicyAnalyzer::Fcfs(_) | PolicyAnalyzer::Fq(_) => {}
        }
    }
}

fn assert_monotonic(values: impl Iterator<Item = f64>) {
    let mut previous = f64::NEG_INFINITY;
    for value in values {
        assert!(value >= previous, "{value} < {previous}");
        previous = value;
    }
}

#[test]
fn test_per_flow_profile_groups_flows() {
    let analysis = analysis();
    match analysis.analyzer(Policy::SjfInorder).unwrap() {
        PolicyAnalyzer::SjfInorder(a) => {
            assert_eq!(a.flow_count(), 3);
            assert_eq!(a.profile().points(), &[(100u64, 50.0), (200u64, 150.0)][..]);
        }
        other => panic!("unexpected analyzer {:?}", other.policy()),
    }
}

#[test]
fn test_empty_trace_fails_analysis() {
    let result = analyze_reader(Cursor::new(""), &Policy::ALL, bounds());
    assert!(matches!(result, Err(AnalyzerError::EmptyTrace)));
}
