use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let mut cmd = clap::Command::new("evado")
        .version("0.1.0")
        .author("Evado Contributors")
        .about("Fetch a URL past paywalls and anti-bot screens, output Markdown")
        .arg(clap::arg!(<URL> "URL to convert"))
        .arg(
            clap::arg!(-o --output <FILE> "Output file (default: stdout)")
                .value_name("FILE")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(clap::arg!(-b --bypass "Race the full strategy tiers"))
        .arg(
            clap::arg!(-s --strategy <STRATEGY> "Force one strategy, or \"auto\"")
                .default_value("auto")
                .value_parser([
                    "auto",
                    "direct",
                    "googlebot",
                    "facebookbot",
                    "bingbot",
                    "archive",
                    "twelveft",
                    "jina",
                    "exa",
                    "googlenews",
                ]),
        )
        .arg(clap::arg!(--json "Wrap the output in a JSON envelope"))
        .arg(clap::arg!(--no_images "Drop images and figures from the Markdown"))
        .arg(clap::arg!(--no_cache "Skip the URL result cache"))
        .arg(clap::arg!(--timeout <SECS> "Per-request HTTP timeout in seconds").default_value("20"))
        .arg(clap::arg!(-v --verbose "Enable debug logging and progress output"));

    clap_complete::generate_to(clap_complete::shells::Bash, &mut cmd, "evado", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Zsh, &mut cmd, "evado", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Fish, &mut cmd, "evado", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::PowerShell, &mut cmd, "evado", &completions_dir).unwrap();
}
