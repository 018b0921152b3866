extern crate clap;
extern crate env_logger;
extern crate failure;
#[macro_use]
extern crate log;
extern crate mandelbrot;
extern crate num;
extern crate num_cpus;

use clap::{App, Arg, ArgMatches};
use failure::{format_err, Error};
use mandelbrot::{Renderer, Viewport};
use num::Complex;
use std::str::FromStr;
use std::time::Instant;

fn parse_pair<T>(s: &str, separator: char) -> Option<(T, T)>
where
    T: FromStr,
{
    match s.find(separator) {
        None => None,
        Some(index) => match (T::from_str(&s[..index]), T::from_str(&s[index + 1..])) {
            (Ok(l), Ok(r)) => Some((l, r)),
            _ => None,
        },
    }
}

fn parse_complex(s: &str) -> Option<Complex<f64>> {
    match parse_pair(s, ',') {
        Some((re, im)) => Some(Complex { re, im }),
        None => None,
    }
}

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    match parse_pair::<T>(s, separator) {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

fn validate_number<T: FromStr>(s: &str, isnotanumber_err: &str) -> Result<(), String> {
    match T::from_str(s) {
        Ok(_) => Ok(()),
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

fn value<T: FromStr>(matches: &ArgMatches, name: &str) -> Result<T, Error> {
    let raw = matches
        .value_of(name)
        .ok_or_else(|| format_err!("missing value for --{}", name))?;
    T::from_str(raw).map_err(|_| format_err!("could not parse --{} value {:?}", name, raw))
}

const OUTPUT: &str = "output";
const SIZE: &str = "size";
const CENTER: &str = "center";
const SCALE: &str = "scale";
const THREADS: &str = "threads";
const ITERATIONS: &str = "iterations";

fn args<'a>(default_threads: &'a str) -> ArgMatches<'a> {
    App::new("mandel")
        .version("0.1.0")
        .about("Mandelbrot renderer")
        .arg(
            Arg::with_name(OUTPUT)
                .required(true)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .help("Output file; the format follows the extension"),
        )
        .arg(
            Arg::with_name(SIZE)
                .required(false)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("1080x1080")
                .validator(|s| validate_pair::<usize>(&s, 'x', "Could not parse output image size"))
                .help("Size of output image"),
        )
        .arg(
            Arg::with_name(CENTER)
                .required(false)
                .long(CENTER)
                .short("c")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("0,0")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse center point"))
                .help("Center of the view on the complex plane"),
        )
        .arg(
            Arg::with_name(SCALE)
                .required(false)
                .long(SCALE)
                .short("z")
                .takes_value(true)
                .default_value("2")
                .validator(|s| validate_number::<f64>(&s, "Could not parse scale"))
                .help("Distance from the center to the nearer edge of the view"),
        )
        .arg(
            Arg::with_name(THREADS)
                .required(false)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .default_value(default_threads)
                .validator(|s| validate_number::<usize>(&s, "Could not parse thread count"))
                .help("Number of threads to use in renderer"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .required(false)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("1000")
                .validator(|s| validate_number::<usize>(&s, "Could not parse iteration count"))
                .help("Maximum number of iterations per point"),
        )
        .get_matches()
}

fn run(matches: &ArgMatches) -> Result<(), Error> {
    let size = matches.value_of(SIZE).unwrap_or_default();
    let (width, height) =
        parse_pair::<usize>(size, 'x').ok_or_else(|| format_err!("Error parsing image dimensions"))?;
    let center = matches.value_of(CENTER).unwrap_or_default();
    let center = parse_complex(center).ok_or_else(|| format_err!("Error parsing center point"))?;
    let scale: f64 = value(matches, SCALE)?;
    let iterations: usize = value(matches, ITERATIONS)?;
    let threads: usize = value(matches, THREADS)?;
    let output = matches
        .value_of(OUTPUT)
        .ok_or_else(|| format_err!("missing output file"))?;

    let viewport = Viewport::new(center, scale, width, height, iterations)?;
    let renderer = Renderer::with_threads(viewport, threads)?;
    info!(
        "Mandelbrot {} scale {} at {}x{}, {} iterations",
        center, scale, width, height, iterations
    );

    let started = Instant::now();
    let buffer = if threads == 1 {
        renderer.render_single()
    } else {
        renderer.render()
    };
    info!(
        "rendered in {:?} with {} workers",
        started.elapsed(),
        renderer.workers()
    );

    let image = buffer
        .to_image()
        .ok_or_else(|| format_err!("{}x{} image is too large to encode", width, height))?;
    image.save(output)?;
    info!("wrote {}", output);
    Ok(())
}

fn main() {
    env_logger::init();
    let default_threads = num_cpus::get().to_string();
    let matches = args(&default_threads);
    if let Err(e) = run(&matches) {
        eprintln!("Render failure: {}", e);
        std::process::exit(1);
    }
}
