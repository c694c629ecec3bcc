use dqa_ai::normalize::normalize_distances;
use pretty_assertions::assert_eq;

#[test]
fn empty_input_yields_empty_output() {
    assert_eq!(normalize_distances(&[]), Vec::<f64>::new());
}

#[test]
fn all_equal_distances_map_to_maximal_similarity() {
    assert_eq!(normalize_distances(&[0.42, 0.42, 0.42]), vec![1.0, 1.0, 1.0]);
    assert_eq!(normalize_distances(&[7.0]), vec![1.0]);
}

#[test]
fn smallest_distance_maps_to_one_and_largest_to_zero() {
    let sims = normalize_distances(&[0.2, 0.5, 0.8]);
    assert_eq!(sims[0], 1.0);
    assert_eq!(sims[2], 0.0);
    assert!(sims[1] > 0.49 && sims[1] < 0.51);
}

#[test]
fn output_is_always_within_unit_interval() {
    // Unbounded collaborator units still land in [0, 1].
    let sims = normalize_distances(&[-3.5, 0.0, 12.0, 250.0, 99.9]);
    for s in sims {
        assert!((0.0..=1.0).contains(&s), "similarity out of range: {s}");
    }
}

#[test]
fn ordering_is_inverted_smaller_distance_means_higher_similarity() {
    let sims = normalize_distances(&[1.0, 3.0, 2.0]);
    assert!(sims[0] > sims[2]);
    assert!(sims[2] > sims[1]);
}
