//! Benchmarks for the HPL decoder.
//!
//! Run with: cargo bench --bench decode

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use hpl_processor::{DecodeConfig, HplDecoder};
use std::fmt::Write;
use std::io::Cursor;

/// Build a stare file with `records` rays of `gates` gates
fn synthetic_file(records: usize, gates: usize) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        "Filename:\tStare_116_20210315_13.hpl\n\
         System ID:\t116\n\
         Number of gates:\t{gates}\n\
         Range gate length (m):\t30.0\n\
         Gate length (pts):\t10\n\
         Pulses/ray:\t20000\n\
         No. of rays in file:\t{records}\n\
         Scan type:\tStare\n\
         Focus range:\t65535\n\
         Start time:\t20210315 13:00:04.83\n\
         Resolution (m/s):\t0.0382\n\
         Altitude of measurement (center of gate) = (range gate + 0.5) * Gate length\n\
         Data line 1: Decimal time (hours)  Azimuth (degrees)  Elevation (degrees) Pitch (degrees) Roll (degrees)\n\
         f9.6,1x,f6.2,1x,f6.2,1x,f6.2,1x,f6.2\n\
         Data line 2: Range Gate  Doppler (m/s)  Intensity (SNR + 1)  Beta (m-1 sr-1)\n\
         i3,1x,f6.4,1x,f8.6,1x,e12.6 - repeat for no. gates\n\
         ****\n"
    );

    for record in 0..records {
        let hours = 13.0 + record as f64 * 3.0 / 3600.0;
        let _ = writeln!(out, "{:.6} 0.00 90.00 -0.10 0.30", hours);
        for gate in 0..gates {
            let doppler = ((record + gate) % 17) as f64 * 0.0127 - 0.1;
            let _ = writeln!(out, "{:>3} {:.4} {:.6} {:.6E}", gate, doppler, 1.0048, 3.4e-7);
        }
    }
    out
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    let decoder = HplDecoder::new(DecodeConfig::default());

    for (records, gates) in [(100, 200), (1_000, 200), (1_200, 1_000)] {
        let contents = synthetic_file(records, gates);
        group.throughput(Throughput::Bytes(contents.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", records, gates)),
            &contents,
            |b, contents| {
                b.iter(|| {
                    decoder
                        .decode(Cursor::new(black_box(contents.as_bytes())))
                        .unwrap()
                })
            },
        );
    }

    group.finish();
}

fn bench_frames(c: &mut Criterion) {
    let dataset = HplDecoder::default()
        .decode(Cursor::new(synthetic_file(1_000, 200)))
        .unwrap();

    c.bench_function("to_gate_frame_1000x200", |b| {
        b.iter(|| black_box(&dataset).to_gate_frame().unwrap())
    });
}

criterion_group!(benches, bench_decode, bench_frames);
criterion_main!(benches);
