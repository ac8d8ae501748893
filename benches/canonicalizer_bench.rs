use criterion::{black_box, criterion_group, criterion_main, Criterion};
use job_dedup::canonicalizer::{canonical_key, clean_link, CleanupPolicy};

const LINKS: [&str; 4] = [
    "https://www.indeed.com/rc/clk?jk=abc123&from=serp&vjs=3",
    "https://www.wiraa.com/r?ref=feed&source=https%3A%2F%2Fjobs.lever.co%2Facme%2F42",
    "https://jobs.ashbyhq.com/acme/6b2b92c8-5bc6-432a-91a1-5e5fb6fc1ad4/application?utm_source=li",
    "https://WWW.Example.com/careers/jobs/?team=eng&id=9&utm_campaign=x#apply",
];

fn bench_canonical_key(c: &mut Criterion) {
    c.bench_function("canonical_key", |b| {
        b.iter(|| {
            for link in LINKS {
                black_box(canonical_key(black_box(link)));
            }
        })
    });
}

fn bench_clean_link(c: &mut Criterion) {
    let policy = CleanupPolicy::default();
    c.bench_function("clean_link", |b| {
        b.iter(|| {
            for link in LINKS {
                black_box(clean_link(black_box(link), &policy));
            }
        })
    });
}

criterion_group!(benches, bench_canonical_key, bench_clean_link);
criterion_main!(benches);
