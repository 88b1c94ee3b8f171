//! Benchmarks for the native call boundary.
//!
//! Measures the cost of each hop a value takes across the boundary:
//! - Scalar bindings on their own
//! - Typed native dispatch at a few arities
//! - String extraction into an owned buffer
//! - Host callbacks invoked from native code
//!
//! ## Profiling with Puffin
//!
//! ```bash
//! cargo bench --features profile-with-puffin
//! ```

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use wirebind::prelude::*;

#[cfg(feature = "profile-with-puffin")]
fn setup_profiler() {
    puffin::set_scopes_on(true);
}

#[cfg(not(feature = "profile-with-puffin"))]
fn setup_profiler() {}

/// Call at the end of each benchmark iteration to flush profiling data.
#[cfg(feature = "profile-with-puffin")]
fn end_profiling_frame() {
    puffin::GlobalProfiler::lock().new_frame();
}

#[cfg(not(feature = "profile-with-puffin"))]
fn end_profiling_frame() {}

fn bench_scalar_bindings(c: &mut Criterion) {
    let rt = Runtime::new();
    let number = Dynamic::Number(300.0);
    let text = Dynamic::string("12345");

    let mut group = c.benchmark_group("bindings");
    group.bench_function("u8_from_number", |b| {
        b.iter(|| u8::from_wire(black_box(&number), &rt))
    });
    group.bench_function("i32_from_string", |b| {
        b.iter(|| i32::from_wire(black_box(&text), &rt))
    });
    group.bench_function("f64_to_wire", |b| b.iter(|| black_box(1.5f64).to_wire(&rt)));
    group.finish();
}

fn bench_native_dispatch(c: &mut Criterion) {
    setup_profiler();

    let rt = Runtime::new();
    let nullary = NativeFn::wrap("nullary", || ()).into_function(&rt);
    let add = NativeFn::wrap("add", |a: i32, b: i32| a + b).into_function(&rt);
    let sum4 = |a: f64, b: f64, c: f64, d: f64| a + b + c + d;
    let sum4 = NativeFn::wrap("sum4", sum4).into_function(&rt);
    let this = Dynamic::Undefined;

    let mut group = c.benchmark_group("dispatch");
    group.bench_function("arity_0", |b| {
        b.iter(|| {
            let result = rt.call(&nullary, &this, &[]);
            end_profiling_frame();
            result
        })
    });

    let two = [Dynamic::Number(1.0), Dynamic::Number(2.0)];
    group.bench_function("arity_2", |b| {
        b.iter(|| {
            let result = rt.call(&add, &this, black_box(&two));
            end_profiling_frame();
            result
        })
    });

    let four = [
        Dynamic::Number(1.0),
        Dynamic::Number(2.0),
        Dynamic::Number(3.0),
        Dynamic::Number(4.0),
    ];
    group.bench_function("arity_4", |b| {
        b.iter(|| {
            let result = rt.call(&sum4, &this, black_box(&four));
            end_profiling_frame();
            result
        })
    });
    group.finish();
}

fn bench_string_extraction(c: &mut Criterion) {
    let rt = Runtime::new();
    let len = NativeFn::wrap("len", |s: CStrArg| s.len() as u32).into_function(&rt);
    let this = Dynamic::Undefined;

    let mut group = c.benchmark_group("strings");
    for size in [8usize, 256, 4096] {
        let arg = [Dynamic::string("x".repeat(size))];
        group.bench_function(format!("cstr_{size}"), |b| {
            b.iter(|| rt.call(&len, &this, black_box(&arg)))
        });
    }
    group.finish();
}

fn bench_callbacks(c: &mut Criterion) {
    let rt = Runtime::new();
    let add_one = rt.function("addOne", |_, _, args| {
        Ok(Dynamic::Number(coerce::to_number(&args[0]) + 1.0))
    });
    let this = Dynamic::Undefined;

    let mut group = c.benchmark_group("callbacks");

    // Capture and release of the persistent root
    let capture = NativeFn::wrap("capture", |_cb: Callback| ()).into_function(&rt);
    let args = [add_one.clone()];
    group.bench_function("capture_release", |b| {
        b.iter(|| rt.call(&capture, &this, black_box(&args)))
    });

    let cb = Callback::from_wire(&add_one, &rt).expect("addOne is a function");
    group.bench_function("call_i32", |b| b.iter(|| cb.call::<i32>((black_box(41),))));
    group.finish();
}

criterion_group!(
    benches,
    bench_scalar_bindings,
    bench_native_dispatch,
    bench_string_extraction,
    bench_callbacks
);
criterion_main!(benches);
