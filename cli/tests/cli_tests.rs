#[test]
fn curve() {
    trycmd::TestCases::new()
        .case("tests/curve/*.toml")
        .env("RAREFACTION_ALLOW_STDIN", "true")
        .default_bin_name("rarefaction");
}

#[test]
fn depths() {
    trycmd::TestCases::new()
        .case("tests/depths/*.toml")
        .env("RAREFACTION_ALLOW_STDIN", "true")
        .default_bin_name("rarefaction");
}

#[test]
fn summary() {
    trycmd::TestCases::new()
        .case("tests/summary/*.toml")
        .env("RAREFACTION_ALLOW_STDIN", "true")
        .default_bin_name("rarefaction");
}
