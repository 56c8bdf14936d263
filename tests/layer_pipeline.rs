use pretty_assertions::assert_eq;
use q8infer::net::layer::{concat, split_lanes, LayerPipeline, OutputProjector, Schedule};
use q8infer::net::lut::ActivationLut;
use q8infer::net::quant::QVec;
use q8infer::net::{A_LEN, B_LEN, C_LEN, HIDDEN_LEN, LANE_OUTPUTS};

#[test]
fn split_sends_even_to_lane1_and_odd_to_lane2() {
    let b = QVec::<B_LEN>::from_fn(|i| i as i32 * 10);
    let (l1, l2) = split_lanes(&b);
    assert_eq!(l1.as_slice(), &[0, 20, 40, 60, 80, 100, 120, 140]);
    assert_eq!(l2.as_slice(), &[10, 30, 50, 70, 90, 110, 130, 150]);
}

#[test]
fn concat_puts_lane1_first() {
    let hidden = concat(&QVec::filled(1), &QVec::filled(2));
    let mut expected = vec![1; LANE_OUTPUTS];
    expected.extend(vec![2; LANE_OUTPUTS]);
    assert_eq!(hidden.to_vec(), expected);
}

#[test]
fn each_lane_uses_its_own_bias() {
    // No multiplied weights: each lane's output is just its bias / 256
    let mut b = [0i32; B_LEN];
    b[0] = 256 * 3;
    b[1] = 256 * 5;
    let a = QVec::<A_LEN>::filled(100);
    let lut = ActivationLut::identity();
    let hidden = LayerPipeline::new(&lut).forward(&a, &QVec::from_array(b), Schedule::Sequential);
    assert!(hidden.iter().take(LANE_OUTPUTS).all(|&v| v == 3));
    assert!(hidden.iter().skip(LANE_OUTPUTS).all(|&v| v == 5));
}

#[test]
fn lane_output_passes_through_lut() {
    // Lane sum = 7 * 256 * 40 / 256 = 280, clamped to index 255
    let a = QVec::<A_LEN>::filled(256);
    let w = QVec::from_array([0, 40, 40, 40, 40, 40, 40, 40]);
    let lut = ActivationLut::new(QVec::from_fn(|i| -(i as i32)));
    let out = LayerPipeline::new(&lut).run_lane(&a, &w);
    assert!(out.iter().all(|&v| v == -255));
}

#[test]
fn parallel_lanes_match_sequential() {
    let a = QVec::<A_LEN>::from_fn(|i| ((i * 37) % 300) as i32 - 20);
    let b = QVec::<B_LEN>::from_fn(|i| (i as i32 - 8) * 9);
    let lut = ActivationLut::hard_sigmoid();
    let pipe = LayerPipeline::new(&lut);
    assert_eq!(pipe.forward(&a, &b, Schedule::Sequential), pipe.forward(&a, &b, Schedule::ParallelLanes));
}

#[test]
fn projector_pairs_hidden_values_without_activation() {
    let hidden = QVec::<HIDDEN_LEN>::from_fn(|i| i as i32 * 256);
    let c = QVec::<C_LEN>::from_array([128, 1, 2]);
    let out = OutputProjector::new(c).project(&hidden);
    for m in 0..out.len() {
        let expected = (128 + (2 * m as i32) * 256 + (2 * m as i32 + 1) * 256 * 2) / 256;
        assert_eq!(out[m], expected, "output {}", m);
    }
    // Far above the LUT range: proves nothing was squashed
    assert_eq!(out[63], (128 + 126 * 256 + 127 * 512) / 256);
}
