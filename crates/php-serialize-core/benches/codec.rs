//! Benchmarks for the PHP serialize codec.

use std::collections::BTreeMap;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use php_serialize_core::{from_bytes, from_bytes_as, from_bytes_seq, php_record, to_bytes, value_to_bytes};

php_record! {
    #[derive(Debug, Default)]
    struct Field {
        #[php(rename = "type")]
        pub kind: String,
        pub label: String,
        pub required: bool,
    }
}

php_record! {
    #[derive(Debug, Default)]
    struct Form {
        pub fields: Vec<Field>,
        pub settings: BTreeMap<String, String>,
        pub permissions: Vec<String>,
    }
}

fn form_object() -> String {
    let field = |ty: &str, label: &str, required: bool| {
        format!(
            "O:5:\"Field\":3:{{s:4:\"type\";s:{}:\"{}\";s:5:\"label\";s:{}:\"{}\";s:8:\"required\";b:{};}}",
            ty.len(),
            ty,
            label.len(),
            label,
            u8::from(required)
        )
    };
    format!(
        "O:4:\"Form\":3:{{s:6:\"fields\";a:3:{{i:0;{}i:1;{}i:2;{}}}s:8:\"settings\";a:2:{{s:11:\"submit_text\";s:6:\"Submit\";s:15:\"success_message\";s:10:\"Thank you!\";}}s:11:\"permissions\";a:3:{{i:0;s:4:\"read\";i:1;s:5:\"write\";i:2;s:6:\"delete\";}}}}",
        field("text", "Name", true),
        field("email", "Email", true),
        field("textarea", "Message", false)
    )
}

fn simple_types(c: &mut Criterion) {
    let mut group = c.benchmark_group("simple_types");

    for (name, data) in [
        ("null", &b"N;"[..]),
        ("bool", &b"b:1;"[..]),
        ("int", &b"i:1234567890;"[..]),
        ("float", &b"d:3.141592653589793;"[..]),
    ] {
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_function(name, |b| b.iter(|| from_bytes(black_box(data))));
    }

    group.finish();
}

fn strings(c: &mut Criterion) {
    let mut group = c.benchmark_group("strings");

    for len in [5_usize, 100, 10_000, 1_000_000] {
        let data = format!("s:{}:\"{}\";", len, "x".repeat(len));
        let data = data.as_bytes();
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_function(format!("{}b", len), |b| b.iter(|| from_bytes(black_box(data))));
    }

    group.finish();
}

fn arrays(c: &mut Criterion) {
    let mut group = c.benchmark_group("arrays");

    for n in [10_usize, 100, 1000] {
        let items: String = (0..n).map(|i| format!("i:{};i:{};", i, i * 2)).collect();
        let list = format!("a:{}:{{{}}}", n, items);
        let list = list.as_bytes();
        group.throughput(Throughput::Bytes(list.len() as u64));
        group.bench_function(format!("list_{}", n), |b| b.iter(|| from_bytes(black_box(list))));
        group.bench_function(format!("typed_list_{}", n), |b| {
            b.iter(|| from_bytes_seq::<i64>(black_box(list)))
        });
    }

    // Out-of-order indices take the rewind path
    let shuffled: String = (0..100).rev().map(|i| format!("i:{};i:{};", i, i)).collect();
    let shuffled = format!("a:100:{{{}}}", shuffled);
    let shuffled = shuffled.as_bytes();
    group.bench_function("unordered_100", |b| b.iter(|| from_bytes(black_box(shuffled))));

    let assoc: String = (0..100)
        .map(|i| {
            let key = format!("key_{}", i);
            format!("s:{}:\"{}\";i:{};", key.len(), key, i)
        })
        .collect();
    let assoc = format!("a:100:{{{}}}", assoc);
    let assoc = assoc.as_bytes();
    group.throughput(Throughput::Bytes(assoc.len() as u64));
    group.bench_function("assoc_100", |b| b.iter(|| from_bytes(black_box(assoc))));

    group.finish();
}

fn nested_structures(c: &mut Criterion) {
    let mut group = c.benchmark_group("nested");

    for depth in [10, 50] {
        let mut s = String::from("s:4:\"leaf\";");
        for i in 0..depth {
            let key = format!("k{}", i % 10);
            s = format!("a:1:{{s:{}:\"{}\";{}}}", key.len(), key, s);
        }
        let data = s.as_bytes();
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_function(format!("depth_{}", depth), |b| b.iter(|| from_bytes(black_box(data))));
    }

    group.finish();
}

fn records(c: &mut Criterion) {
    let mut group = c.benchmark_group("records");

    let data = form_object();
    let data = data.as_bytes();
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("decode_untyped", |b| b.iter(|| from_bytes(black_box(data))));
    group.bench_function("decode_typed", |b| b.iter(|| from_bytes_as::<Form>(black_box(data))));

    let form: Form = from_bytes_as(data).unwrap();
    group.bench_function("encode_typed", |b| b.iter(|| to_bytes(black_box(&form))));

    let value = from_bytes(data).unwrap();
    group.bench_function("encode_value", |b| b.iter(|| value_to_bytes(black_box(&value))));

    group.finish();
}

#[cfg(feature = "serde")]
fn json_conversion(c: &mut Criterion) {
    use php_serialize_core::json::to_json_string;

    let mut group = c.benchmark_group("json");

    let data = br#"a:3:{s:4:"name";s:5:"Alice";s:3:"age";i:30;s:4:"tags";a:2:{i:0;s:5:"admin";i:1;s:6:"active";}}"#;

    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("parse_and_convert", |b| {
        b.iter(|| {
            let value = from_bytes(black_box(data)).unwrap();
            to_json_string(&value).unwrap()
        })
    });

    group.finish();
}

criterion_group!(benches, simple_types, strings, arrays, nested_structures, records);

#[cfg(feature = "serde")]
criterion_group!(serde_benches, json_conversion);

#[cfg(feature = "serde")]
criterion_main!(benches, serde_benches);

#[cfg(not(feature = "serde"))]
criterion_main!(benches);
