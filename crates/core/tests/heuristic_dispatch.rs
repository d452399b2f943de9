//! Table-driven tests for the per-heuristic MSHR-threshold asymmetries
//! spec.md §9 calls out by name: stream's sense is inverted relative to
//! IP-stride, and AMPM's positive/negative scans use independent
//! thresholds. Expressing these as one `#[rstest]` case table per heuristic
//! keeps the threshold values next to their expected fill level instead of
//! scattered across separate hand-written tests.

mod support;

use pretty_assertions::assert_eq;
use rstest::rstest;

use l2pf_core::heuristics::{AmpmHeuristic, IpStrideHeuristic, StreamHeuristic};
use l2pf_core::sandbox::Sandbox;
use l2pf_core::FillLevel;
use support::RecordingHost;

#[rstest]
#[case::below_threshold(7, FillLevel::L2)]
#[case::at_threshold(8, FillLevel::Llc)]
#[case::well_above(20, FillLevel::Llc)]
fn ip_stride_targets_l2_only_below_its_mshr_threshold(#[case] occupancy: i32, #[case] expected: FillLevel) {
    let mut h = IpStrideHeuristic::new(8, 2, 8);
    let mut sb = Sandbox::new(300, 0);
    let mut host = RecordingHost::new();
    host.occupancy = occupancy;
    host.cycle = 1;
    h.observe(0, 0x1000, 0xAAAA, false, &mut sb, &mut host).unwrap();
    host.cycle = 2;
    h.observe(0, 0x1040, 0xAAAA, false, &mut sb, &mut host).unwrap();
    host.cycle = 3;
    h.observe(0, 0x1080, 0xAAAA, false, &mut sb, &mut host).unwrap();
    assert_eq!(host.issued[0].2, expected);
}

#[rstest]
#[case::at_threshold(8, FillLevel::L2)]
#[case::just_above(9, FillLevel::Llc)]
#[case::well_above(20, FillLevel::Llc)]
fn stream_targets_llc_above_its_mshr_threshold_the_inverse_sense_of_ip_stride(
    #[case] occupancy: i32,
    #[case] expected: FillLevel,
) {
    let mut h = StreamHeuristic::new(4, 2, 8);
    let mut sb = Sandbox::new(300, 0);
    let mut host = RecordingHost::new();
    host.occupancy = occupancy;
    h.observe(0, 0x1000, false, &mut sb, &mut host).unwrap();
    h.observe(0, 0x1040, false, &mut sb, &mut host).unwrap();
    h.observe(0, 0x1080, false, &mut sb, &mut host).unwrap();
    assert_eq!(host.issued[0].2, expected);
}

#[rstest]
#[case::below_both(7, FillLevel::L2, FillLevel::L2)]
#[case::between_thresholds(9, FillLevel::Llc, FillLevel::L2)]
#[case::above_both(12, FillLevel::Llc, FillLevel::Llc)]
fn ampm_scores_positive_and_negative_scans_against_independent_thresholds(
    #[case] occupancy: i32,
    #[case] expected_positive: FillLevel,
    #[case] expected_negative: FillLevel,
) {
    let mut h = AmpmHeuristic::new(4, 2, 8, 12);
    let mut sb = Sandbox::new(2000, 0);
    let mut host = RecordingHost::new();
    host.occupancy = occupancy;

    // Ascending progression on page 0x1: offsets 0, 1, 2 predict offset 3.
    h.observe(0, 0x1000, false, &mut sb, &mut host).unwrap();
    h.observe(0, 0x1040, false, &mut sb, &mut host).unwrap();
    h.observe(0, 0x1080, false, &mut sb, &mut host).unwrap();
    let positive = host.issued.iter().find(|&&(_, pf, _)| pf == 0x10C0);
    assert_eq!(positive.map(|&(_, _, level)| level), Some(expected_positive));

    // Descending progression on a separate page 0x2: offsets 12, 8, 4 predict
    // offset 0.
    host.issued.clear();
    h.observe(0, 0x2000 | (12 << 6), false, &mut sb, &mut host).unwrap();
    h.observe(0, 0x2000 | (8 << 6), false, &mut sb, &mut host).unwrap();
    h.observe(0, 0x2000 | (4 << 6), false, &mut sb, &mut host).unwrap();
    let negative = host.issued.iter().find(|&&(_, pf, _)| pf == 0x2000);
    assert_eq!(negative.map(|&(_, _, level)| level), Some(expected_negative));
}

#[rstest]
#[case::degree_one(1)]
#[case::degree_two(2)]
#[case::degree_four(4)]
fn ip_stride_never_issues_more_than_its_configured_degree_per_access(#[case] degree: usize) {
    let mut h = IpStrideHeuristic::new(8, degree, 8);
    let mut sb = Sandbox::new(300, 0);
    let mut host = RecordingHost::new();
    host.cycle = 1;
    h.observe(0, 0x1000, 0xAAAA, false, &mut sb, &mut host).unwrap();
    host.cycle = 2;
    h.observe(0, 0x1040, 0xAAAA, false, &mut sb, &mut host).unwrap();
    host.cycle = 3;
    h.observe(0, 0x1080, 0xAAAA, false, &mut sb, &mut host).unwrap();
    assert!(host.issued.len() <= degree);
}
