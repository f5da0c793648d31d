//! Property-based tests for flowline-core.
//!
//! Format conversion accuracy and saturation, pull accounting across block
//! sizes, block adapter byte conservation, and sample-rate converter frame
//! accounting.

use flowline_core::convert::{
    f32_to_i16, f32_to_i24_packed, f32_to_i32, i16_to_f32, i24_packed_to_f32, i32_to_f32,
};
use flowline_core::{
    F32, FixedBlockReader, FixedBlockWriter, FlowGraph, Quality, SampleRateConverter, SinkFloat,
    SourceFloat,
};
use proptest::prelude::*;

const INPUT_RATES: [u32; 7] = [8_000, 11_025, 16_000, 22_050, 44_100, 48_000, 96_000];
const OUTPUT_RATES: [u32; 5] = [8_000, 16_000, 32_000, 44_100, 48_000];

fn i24_bytes(value: i32) -> [u8; 3] {
    let b = value.to_le_bytes();
    [b[0], b[1], b[2]]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Every 24-bit value survives decode then encode bit for bit.
    #[test]
    fn i24_integer_round_trip(value in -8_388_608i32..8_388_608i32) {
        let bytes = i24_bytes(value);
        prop_assert_eq!(f32_to_i24_packed(i24_packed_to_f32(bytes)), bytes);
    }

    /// Encoding then decoding an in-range float moves it by at most half a
    /// 24-bit step.
    #[test]
    fn i24_float_round_trip(x in -1.0f32..0.999_999f32) {
        let back = i24_packed_to_f32(f32_to_i24_packed(x));
        prop_assert!(
            (back - x).abs() <= 1.0 / 16_777_216.0 + f32::EPSILON,
            "{} -> {}", x, back
        );
    }

    /// Out-of-range input saturates instead of wrapping.
    #[test]
    fn integer_encoders_saturate(magnitude in 1.0f32..1.0e6f32) {
        prop_assert_eq!(f32_to_i16(magnitude), i16::MAX);
        prop_assert_eq!(f32_to_i16(-magnitude), i16::MIN);
        prop_assert_eq!(f32_to_i24_packed(magnitude), i24_bytes(8_388_607));
        prop_assert_eq!(f32_to_i24_packed(-magnitude), i24_bytes(-8_388_608));
        prop_assert_eq!(f32_to_i32(magnitude), i32::MAX);
        prop_assert_eq!(f32_to_i32(-magnitude), i32::MIN);
    }

    /// 16- and 32-bit integers decode into [-1, 1).
    #[test]
    fn integer_decoders_stay_in_range(a in any::<i16>(), b in any::<i32>()) {
        let x = i16_to_f32(a);
        let y = i32_to_f32(b);
        prop_assert!((-1.0..1.0).contains(&x));
        prop_assert!((-1.0..=1.0).contains(&y));
    }

    /// Reading through a graph delivers exactly the source's frames, in
    /// order, whatever the block size and read size.
    #[test]
    fn read_delivers_source_in_order(
        block in 1usize..64,
        source_frames in 0usize..500,
        request in 1usize..700,
    ) {
        let mut graph = FlowGraph::with_block_size(block);
        let source = graph.add_node(SourceFloat::new(1)).unwrap();
        let sink = graph.add_node(SinkFloat::new(1)).unwrap();
        graph.connect(source.output(0), sink.input(0)).unwrap();
        let data: Vec<f32> = (0..source_frames).map(|i| i as f32).collect();
        graph.node_mut::<SourceFloat>(source).unwrap().set_data(data, source_frames);

        let mut out = vec![-1.0f32; request];
        let frames = graph.read::<F32>(sink, &mut out, request).unwrap();
        prop_assert_eq!(frames, source_frames.min(request));
        for (i, &s) in out[..frames].iter().enumerate() {
            prop_assert_eq!(s, i as f32);
        }
    }

    /// Chunked reads through a FixedBlockReader reproduce the producer's
    /// byte stream with nothing lost or repeated.
    #[test]
    fn block_reader_conserves_bytes(
        block in 1usize..32,
        total in 0usize..400,
        chunks in prop::collection::vec(1usize..50, 1..40),
    ) {
        let stream: Vec<u8> = (0..total).map(|i| (i % 251) as u8).collect();
        let mut position = 0;
        let mut producer = |dest: &mut [u8], _: u64| {
            let n = dest.len().min(stream.len() - position);
            dest[..n].copy_from_slice(&stream[position..position + n]);
            position += n;
            n
        };

        let mut reader = FixedBlockReader::new(block);
        let mut collected = Vec::new();
        let mut budget = 0;
        for &chunk in chunks.iter().cycle().take(200) {
            let mut buf = vec![0u8; chunk];
            let n = reader.read(&mut buf, &mut producer, 0);
            collected.extend_from_slice(&buf[..n]);
            budget += chunk;
            if n == 0 {
                break;
            }
        }
        prop_assert_eq!(collected.len(), total.min(budget));
        prop_assert_eq!(&collected[..], &stream[..collected.len()]);
    }

    /// A FixedBlockWriter plus flush hands every byte on, in whole blocks.
    #[test]
    fn block_writer_emits_whole_blocks(
        block in 1usize..32,
        chunks in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..50), 0..20),
    ) {
        let mut emitted = Vec::new();
        let mut sizes = Vec::new();
        let mut consumer = |data: &[u8]| {
            sizes.push(data.len());
            emitted.extend_from_slice(data);
            data.len()
        };
        let mut writer = FixedBlockWriter::new(block);
        for chunk in &chunks {
            prop_assert_eq!(writer.write(chunk, &mut consumer), chunk.len());
        }
        let pending = writer.flush(&mut consumer);

        let expected: Vec<u8> = chunks.concat();
        prop_assert!(sizes.iter().all(|&s| s == block));
        let padding = if pending > 0 { block - pending } else { 0 };
        prop_assert_eq!(emitted.len(), expected.len() + padding);
        prop_assert_eq!(&emitted[..expected.len()], &expected[..]);
    }

    /// The sample-rate converter node turns N input frames into
    /// N * output / input frames, to within one frame.
    #[test]
    fn sample_rate_converter_frame_accounting(
        input_rate in prop::sample::select(INPUT_RATES.to_vec()),
        output_rate in prop::sample::select(OUTPUT_RATES.to_vec()),
        input_frames in 1usize..2000,
        block in 4usize..128,
    ) {
        let mut graph = FlowGraph::with_block_size(block);
        let source = graph.add_node(SourceFloat::new(1)).unwrap();
        let resampler =
            SampleRateConverter::make(1, input_rate, output_rate, Quality::Low).unwrap();
        let src = graph.add_node(resampler).unwrap();
        let sink = graph.add_node(SinkFloat::new(1)).unwrap();
        graph.connect(source.output(0), src.input(0)).unwrap();
        graph.connect(src.output(0), sink.input(0)).unwrap();
        graph
            .node_mut::<SourceFloat>(source)
            .unwrap()
            .set_data(vec![0.1; input_frames], input_frames);

        let capacity = input_frames * 13 + 16;
        let mut out = vec![0.0f32; capacity];
        let frames = graph.read::<F32>(sink, &mut out, capacity).unwrap();
        let exact = input_frames as f64 * f64::from(output_rate) / f64::from(input_rate);
        prop_assert!(
            (frames as f64 - exact).abs() <= 1.0,
            "{} -> {}: {} frames in, {} out, expected {}",
            input_rate, output_rate, input_frames, frames, exact
        );
    }
}
