use criterion::{black_box, criterion_group, criterion_main, Criterion};
use writekit_format::{CharacterProps, FkpPacker, Justification, ParagraphProps, TabAlignment, TabStop};

fn character_runs(c: &mut Criterion) {
    let default = CharacterProps::DEFAULT.to_bytes();
    let records: Vec<[u8; 6]> = (0..2000u32)
        .map(|i| {
            CharacterProps {
                bold: i % 2 == 0,
                italic: i % 3 == 0,
                half_points: 20 + (i % 5) as u8 * 4,
                ..CharacterProps::DEFAULT
            }
            .to_bytes()
        })
        .collect();

    c.bench_function("pack_2000_character_runs", |b| {
        b.iter(|| {
            let mut packer = FkpPacker::new(false);
            for (i, record) in records.iter().enumerate() {
                let cp = i as u32 * 8;
                packer.push(cp, cp + 8, record, &default);
            }
            black_box(packer.finish())
        })
    });
}

fn paragraph_runs(c: &mut Criterion) {
    let default = ParagraphProps::DEFAULT.to_bytes(&[]);
    let tabs = [TabStop {
        position: 720,
        alignment: TabAlignment::Normal,
    }];
    let records: Vec<_> = (0..2000u32)
        .map(|i| {
            ParagraphProps {
                justification: if i % 4 == 0 { Justification::Center } else { Justification::Left },
                ..ParagraphProps::DEFAULT
            }
            .to_bytes(&tabs)
        })
        .collect();

    c.bench_function("pack_2000_paragraph_runs_dedup", |b| {
        b.iter(|| {
            let mut packer = FkpPacker::new(true);
            for (i, record) in records.iter().enumerate() {
                let cp = i as u32 * 40;
                packer.push(cp, cp + 40, record, &default);
            }
            black_box(packer.finish())
        })
    });
}

criterion_group!(benches, character_runs, paragraph_runs);
criterion_main!(benches);
