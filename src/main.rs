use anyhow::Result;
use clap::{crate_version, App, Arg};
use skald::build::build_site;
use skald::config::Config;
use std::path::Path;

fn main() -> Result<()> {
    env_logger::init();

    let matches = App::new("skald")
        .version(crate_version!())
        .about("Builds a static blog from plain-text posts")
        .arg(
            Arg::with_name("project")
                .short("p")
                .long("project")
                .value_name("DIR")
                .help("Project directory; searched upward for skald.yaml")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .value_name("DIR")
                .help("Output directory for the generated site")
                .required(true)
                .takes_value(true),
        )
        .get_matches();

    let project = Path::new(matches.value_of("project").unwrap_or("."));
    // required above
    let output = Path::new(matches.value_of("output").unwrap());

    let config = Config::from_directory(project, output)?;
    Ok(build_site(&config)?)
}
