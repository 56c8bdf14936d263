use q8infer::net::lut::ActivationLut;
use q8infer::net::{INPUT_WORDS, OUTPUT_LEN};
use q8infer::stream::{put, receive, run_message, transmit, word_channel, ChannelAdapter, Word};
use q8infer::{InferError, Network, NetworkParams, QVec, Schedule, Segment};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::thread;

fn random_params(rng: &mut SmallRng) -> NetworkParams {
    NetworkParams {
        a: QVec::from_fn(|_| rng.gen_range(-300..=600)),
        b: QVec::from_fn(|_| rng.gen_range(-80..=80)),
        c: QVec::from_fn(|_| rng.gen_range(-512..=512)),
        lut: ActivationLut::new(QVec::from_fn(|_| rng.gen_range(-1000..=1000))),
    }
}

#[test]
fn streamed_output_is_bit_identical_to_sequential() {
    let mut rng = SmallRng::seed_from_u64(7);
    for _ in 0..16 {
        let params = random_params(&mut rng);
        let seq = Network::new(&params).forward(Schedule::Sequential);
        let streamed = run_message(ChannelAdapter::new(), &params.to_words()).unwrap();
        assert_eq!(streamed, seq);
    }
}

#[test]
fn out_of_range_lut_indices_clamp_the_same_way_in_both_forms() {
    // Large inputs and weights push many lane sums past 255 and below 0
    let params = NetworkParams {
        a: QVec::from_fn(|i| if i % 3 == 0 { 5000 } else { -5000 }),
        b: QVec::from_fn(|i| if i % 2 == 0 { 90 } else { -90 }),
        c: QVec::from_array([0, 256, 256]),
        lut: ActivationLut::new(QVec::from_fn(|i| i as i32 * 4)),
    };
    let seq = Network::new(&params).forward(Schedule::Sequential);
    let streamed = run_message(ChannelAdapter::new(), &params.to_words()).unwrap();
    assert_eq!(streamed, seq);
}

#[test]
fn only_the_final_output_word_is_flagged() {
    let mut rng = SmallRng::seed_from_u64(99);
    let params = random_params(&mut rng);
    let (in_tx, mut in_rx) = word_channel();
    let (out_tx, out_rx) = word_channel();
    let worker = thread::spawn(move || ChannelAdapter::new().process(&mut in_rx, &out_tx));
    transmit(&in_tx, &params.to_words()).unwrap();
    let mut words = Vec::new();
    while let Some(w) = out_rx.recv() {
        words.push(w);
    }
    let res = worker.join().unwrap().unwrap();
    assert_eq!(words.len(), OUTPUT_LEN);
    assert!(words[..OUTPUT_LEN - 1].iter().all(|w| !w.last));
    assert!(words[OUTPUT_LEN - 1].last);
    let data: Vec<i32> = words.iter().map(|w| w.data).collect();
    assert_eq!(data, res.to_vec());
}

#[test]
fn input_last_flag_is_ignored() {
    let mut rng = SmallRng::seed_from_u64(3);
    let params = random_params(&mut rng);
    let (tx, rx, handle) = ChannelAdapter::new().spawn();
    let sender = thread::spawn(move || {
        // Flag every input word; framing is by count only
        for v in params.to_words() {
            put(&tx, Word::new(v, true)).unwrap();
        }
        params
    });
    let got = receive(&rx).unwrap();
    let params = sender.join().unwrap();
    handle.join().unwrap().unwrap();
    assert_eq!(got, Network::new(&params).forward(Schedule::Sequential));
}

#[test]
fn short_message_starves_the_adapter() {
    let words: Vec<i32> = vec![1; INPUT_WORDS - 1];
    match run_message(ChannelAdapter::new(), &words) {
        Err(InferError::Starved { segment: Segment::Lut, expected: 256, received: 255 }) => {}
        other => panic!("expected LUT starvation, got {:?}", other),
    }
    match run_message(ChannelAdapter::new(), &words[..100]) {
        Err(InferError::Starved { segment: Segment::A, expected: 448, received: 100 }) => {}
        other => panic!("expected A starvation, got {:?}", other),
    }
}

#[test]
fn overlong_message_is_rejected() {
    let words = vec![0; INPUT_WORDS + 2];
    assert!(matches!(run_message(ChannelAdapter::new(), &words), Err(InferError::Length { .. })));
}

#[test]
fn receive_checks_end_of_message_framing() {
    let (tx, rx) = word_channel();
    let early = thread::spawn(move || {
        for i in 0..OUTPUT_LEN {
            if put(&tx, Word::new(i as i32, i == 10)).is_err() {
                break;
            }
        }
    });
    assert!(matches!(receive(&rx), Err(InferError::Framing { index: 10, .. })));
    drop(rx);
    early.join().unwrap();

    let (tx, rx) = word_channel();
    let missing = thread::spawn(move || {
        for i in 0..OUTPUT_LEN {
            put(&tx, Word::new(i as i32, false)).unwrap();
        }
    });
    assert!(matches!(receive(&rx), Err(InferError::Framing { index: 63, .. })));
    missing.join().unwrap();
}

#[test]
fn channel_holds_a_single_word() {
    let (tx, rx) = word_channel();
    put(&tx, Word::new(1, false)).unwrap();
    assert!(tx.try_send(Word::new(2, false)).is_err(), "second word must wait for the consumer");
    assert_eq!(rx.recv(), Some(Word::new(1, false)));
    put(&tx, Word::new(2, true)).unwrap();
    assert_eq!(rx.recv(), Some(Word::new(2, true)));
    drop(tx);
    assert_eq!(rx.recv(), None);
}

#[test]
fn parallel_and_sequential_adapter_schedules_agree() {
    let mut rng = SmallRng::seed_from_u64(2024);
    let params = random_params(&mut rng);
    let words = params.to_words();
    let par = run_message(ChannelAdapter::with_schedule(Schedule::ParallelLanes), &words).unwrap();
    let seq = run_message(ChannelAdapter::with_schedule(Schedule::Sequential), &words).unwrap();
    assert_eq!(par, seq);
}
