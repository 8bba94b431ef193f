use asset_mirror::{map_to_local_path, should_download_asset, FileManager, HtmlDocument};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use std::path::Path;
use tempfile::tempdir;
use url::Url;

fn bench_html_round_trip(c: &mut Criterion) {
    let html_content = r#"
        <html>
            <head>
                <link rel="stylesheet" href="/style.css">
                <script src="/script.js"></script>
                <link rel="stylesheet" href="/theme.css">
                <style>.hero { background: url(/img/hero.jpg) }</style>
            </head>
            <body>
                <img src="/logo.png" alt="Logo">
                <img src="/banner.jpg" alt="Banner">
                <div style="background: url('/img/tile.png')">Tile</div>
                <video src="/intro.mp4"></video>
            </body>
        </html>
    "#;

    c.bench_function("parse_rewrite_serialize", |b| {
        b.iter(|| {
            let document = HtmlDocument::parse(black_box(html_content));
            for img in document.elements_named("img") {
                img.set_attr("src", "/assets/logo.png");
            }
            let _html = document.serialize().unwrap();
        });
    });
}

fn bench_path_mapping(c: &mut Criterion) {
    let urls: Vec<Url> = [
        "https://example.com/static/img/logo.png",
        "https://example.com/js/app.js?v=1.2.3&build=prod",
        "https://example.com/fonts/",
        "https://cdn.example.com/css/site.css?family=Open+Sans:400,700",
        "https://example.com/api/image",
    ]
    .iter()
    .map(|u| Url::parse(u).unwrap())
    .collect();
    let root = Path::new("site_mirror/assets");

    c.bench_function("map_to_local_path", |b| {
        b.iter(|| {
            for url in &urls {
                let _path = map_to_local_path(black_box(url), root).public_url("/assets");
            }
        });
    });
}

fn bench_classification(c: &mut Criterion) {
    let urls: Vec<Url> = [
        "https://example.com/a/b.png",
        "https://example.com/about",
        "data:image/png;base64,iVBORw0KGgo=",
        "mailto:someone@example.com",
        "https://example.com/fonts/inter.WOFF2",
        "https://example.com/page.html",
    ]
    .iter()
    .map(|u| Url::parse(u).unwrap())
    .collect();

    c.bench_function("should_download_asset", |b| {
        b.iter(|| {
            for url in &urls {
                let _asset = should_download_asset(black_box(url));
            }
        });
    });
}

fn bench_asset_lookup(c: &mut Criterion) {
    let temp_dir = tempdir().unwrap();
    let file_manager = FileManager::new(temp_dir.path()).unwrap();
    let url = Url::parse("https://example.com/static/img/logo.png").unwrap();

    c.bench_function("asset_path_exists", |b| {
        b.iter(|| {
            let _exists = file_manager.asset_path(black_box(&url)).exists();
        });
    });
}

criterion_group!(
    benches,
    bench_html_round_trip,
    bench_path_mapping,
    bench_classification,
    bench_asset_lookup,
);
criterion_main!(benches);
