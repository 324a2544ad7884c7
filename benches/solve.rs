use criterion::{black_box, criterion_group, criterion_main, Criterion};
use crossfill::backtracking_search::ValueOrdering;
use crossfill::{find_fill, FillOptions, Puzzle, Vocabulary};

/// Every string of the given length over the given alphabet.
fn all_words(alphabet: &[char], length: usize) -> Vec<String> {
    (0..length).fold(vec![String::new()], |prefixes, _| {
        prefixes
            .iter()
            .flat_map(|prefix| {
                alphabet.iter().map(move |&c| {
                    let mut word = prefix.clone();
                    word.push(c);
                    word
                })
            })
            .collect()
    })
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let words: Vec<String> = all_words(&['A', 'B', 'C'], 2)
        .into_iter()
        .chain(all_words(&['A', 'B', 'C'], 3))
        .chain(all_words(&['A', 'B', 'C', 'D'], 4))
        .collect();

    let square = Puzzle::from_fn(3, 3, |_, _| true, Vocabulary::new(words.clone()))
        .expect("failed to build 3x3 grid");
    let blocked = Puzzle::from_fn(5, 5, |row, col| (row + col) % 4 != 3, Vocabulary::new(words))
        .expect("failed to build 5x5 grid");

    for (name, value_ordering) in [
        ("least_constraining", ValueOrdering::LeastConstraining),
        ("domain_membership", ValueOrdering::DomainMembership),
    ] {
        let options = FillOptions {
            value_ordering,
            max_states: Some(100_000),
        };

        c.bench_function(&format!("fill_3x3_square_{}", name), |b| {
            b.iter(|| find_fill(black_box(&square), &options))
        });
        c.bench_function(&format!("fill_5x5_blocked_{}", name), |b| {
            b.iter(|| find_fill(black_box(&blocked), &options))
        });
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
