use RustedEngiCalc::Utils::config::RenderConfig;
use RustedEngiCalc::translator::namespace::Value;
use RustedEngiCalc::translator::pipeline::Translator;
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::collections::HashMap;

const REPORT: &str = "q_Ed = 1.35*G_k + 1.5*Q_k
M_Ed = q_Ed*l**2/8
V_Ed = q_Ed*l/2
if M_Ed > 50*kN*m:
    eta = 1
else:
    eta = M_Ed/(50*kN*m)
def A_s(M, d, f=435):
    z = 0.9*d
    return M/(z*f)";

fn namespace() -> HashMap<String, Value> {
    HashMap::from([
        ("G_k".to_string(), Value::quantity(12.0, "kN/m")),
        ("Q_k".to_string(), Value::quantity(5.0, "kN/m")),
        ("l".to_string(), Value::quantity(6.0, "m")),
        ("q_Ed".to_string(), Value::quantity(23.7, "kN/m")),
        ("M_Ed".to_string(), Value::quantity(106.65, "kN*m")),
    ])
}

fn bench_render(c: &mut Criterion) {
    let namespace = namespace();
    c.bench_function("render report", |b| {
        b.iter(|| {
            let mut translator = Translator::new(RenderConfig::default(), &namespace);
            translator.render(black_box(REPORT))
        })
    });
}

fn bench_render_columns(c: &mut Criterion) {
    let namespace = namespace();
    let config = RenderConfig {
        columns: 3,
        ..RenderConfig::default()
    };
    c.bench_function("render report in 3 columns", |b| {
        b.iter(|| {
            let mut translator = Translator::new(config.clone(), &namespace);
            translator.render(black_box(REPORT))
        })
    });
}

criterion_group!(benches, bench_render, bench_render_columns);
criterion_main!(benches);
