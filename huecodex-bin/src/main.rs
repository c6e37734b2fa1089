//! Find the dominant and accent colors of an image, classify them by hue, and print their meanings.

#![deny(unsafe_code, unsafe_op_in_unsafe_fn)]
#![warn(
    clippy::pedantic,
    clippy::cargo,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used,
    clippy::unwrap_in_result,
    clippy::unneeded_field_pattern,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::unnecessary_self_imports,
    clippy::str_to_string,
    clippy::string_to_string,
    clippy::string_slice,
    missing_docs,
    clippy::missing_docs_in_private_items,
    rustdoc::all,
    clippy::float_cmp_const,
    clippy::lossy_float_literal
)]
#![allow(
    clippy::doc_markdown,
    clippy::module_name_repetitions,
    clippy::missing_panics_doc,
    clippy::unreadable_literal
)]

mod cli;

#[allow(clippy::wildcard_imports)]
use cli::*;

use std::{
    fmt::{self, Display},
    path::Path,
    process::ExitCode,
    time::Instant,
};

use clap::Parser;
use colored::Colorize;
use huecodex::{MeaningLookup, MeaningTable, PixelBuffer, ScoredColor, Selection};
use image::{DynamicImage, RgbImage};
use palette::Srgb;

/// Record the running time of a function and print the elapsed time
macro_rules! time {
    ($name: literal, $verbose: expr, $func_call: expr) => {{
        let start = Instant::now();
        let result = $func_call;
        if $verbose {
            println!("{} took {}ms", $name, start.elapsed().as_millis());
        }
        result
    }};
}

/// Error cases for loading the inputs
#[derive(Debug)]
enum AppError {
    /// Failed to read or decode the image file
    ImageLoad(image::ImageError),
    /// The image has a width or height of zero
    EmptyImage,
    /// Failed to read the meanings file
    MeaningsRead(std::io::Error),
    /// Failed to parse the meanings file
    MeaningsParse(serde_json::Error),
}

impl Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::ImageLoad(e) => write!(f, "Failed to load the image file: {e}"),
            AppError::EmptyImage => write!(f, "The image has no pixels"),
            AppError::MeaningsRead(e) => write!(f, "Failed to read the meanings file: {e}"),
            AppError::MeaningsParse(e) => write!(f, "Failed to parse the meanings file: {e}"),
        }
    }
}

fn main() -> ExitCode {
    let options = Options::parse();

    let result = run_analyze_and_print(&options);

    // Returning Result<_> uses Debug printing instead of Display
    if let Err(e) = result {
        eprintln!("{e}");
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Builds a thread pool and then runs `analyze_and_print`
#[cfg(feature = "threads")]
fn run_analyze_and_print(options: &Options) -> Result<(), AppError> {
    match rayon::ThreadPoolBuilder::new()
        .num_threads(usize::from(options.threads))
        .build()
    {
        Ok(pool) => pool.install(|| analyze_and_print(options)),
        Err(e) => {
            if options.verbose {
                println!("Falling back to the global thread pool: {e}");
            }
            analyze_and_print(options)
        }
    }
}

/// Runs `analyze_and_print` on a single thread
#[cfg(not(feature = "threads"))]
fn run_analyze_and_print(options: &Options) -> Result<(), AppError> {
    analyze_and_print(options)
}

/// Load an image and the meanings, find the image's colors, and print the result using the given options
fn analyze_and_print(options: &Options) -> Result<(), AppError> {
    // Input
    let meanings = time!(
        "Meanings loading",
        options.verbose,
        options.meanings.as_deref().map(load_meanings).transpose()
    )?
    .unwrap_or_default();

    let img = time!("Image loading", options.verbose, load_image(&options.image))?;
    let img = img.into_rgb8();

    // Processing
    let selection = {
        let start = Instant::now();
        let result = analyze(&img, options)?;
        if options.verbose {
            println!("Color analysis took {}ms in total", start.elapsed().as_millis());
        }
        result
    };

    // Output
    print_selection(&selection, &meanings, options);

    Ok(())
}

/// Load the image at the given path
fn load_image(path: &Path) -> Result<DynamicImage, AppError> {
    image::open(path).map_err(AppError::ImageLoad)
}

/// Load a meaning table from the JSON file at the given path
fn load_meanings(path: &Path) -> Result<MeaningTable, AppError> {
    let json = std::fs::read_to_string(path).map_err(AppError::MeaningsRead)?;
    serde_json::from_str(&json).map_err(AppError::MeaningsParse)
}

/// Run each step of the pipeline, printing its running time and result size if verbose
fn analyze(image: &RgbImage, options: &Options) -> Result<Selection, AppError> {
    let verbose = options.verbose;
    let analysis = options.analysis_options();

    let buffer = PixelBuffer::from_rgb_image(image);
    if buffer.is_empty() {
        return Err(AppError::EmptyImage);
    }

    let thumbnail = time!(
        "Image downscale",
        verbose,
        huecodex::quantize::downscale(&buffer, analysis.max_dimension)
    );

    let buffer = if let Some(thumbnail) = &thumbnail {
        if verbose {
            let (width, height) = thumbnail.dimensions();
            println!("Downscaled the image to {width}x{height}");
        }
        PixelBuffer::from_rgb_image(thumbnail)
    } else {
        if verbose {
            println!("Skipping downscale since the image was below the max dimension");
        }
        buffer
    };

    let unique = time!("Preprocessing", verbose, huecodex::unique_colors(buffer.pixels()));

    if verbose {
        println!("Reduced image to {} unique colors", unique.num_colors());
    }

    let palette = time!(
        "Quantization",
        verbose,
        huecodex::quantize::quantize(
            &unique,
            analysis.palette_size,
            analysis.kmeans_iterations,
            analysis.convergence_threshold,
            analysis.seed,
        )
    );

    if verbose {
        println!("Quantized to a palette of {} colors", palette.len());
    }

    let scored = time!("Scoring", verbose, huecodex::score_palette(&palette, &analysis));

    Ok(time!(
        "Selection",
        verbose,
        huecodex::select::select(&scored, analysis.n_dominant, analysis.n_accent)
    ))
}

/// Format a color based off the provided options
fn format_color(color: Srgb<u8>, options: &Options) -> String {
    let text = match options.output {
        FormatOutput::Hex => huecodex::color::hex(color),
        FormatOutput::Rgb => format!("({},{},{})", color.red, color.green, color.blue),
        FormatOutput::Swatch => return "   ".on_truecolor(color.red, color.green, color.blue).to_string(),
    };

    match options.colorize {
        Some(ColorizeOutput::Fg) => text.truecolor(color.red, color.green, color.blue).to_string(),
        Some(ColorizeOutput::Bg) => text.on_truecolor(color.red, color.green, color.blue).to_string(),
        None => text,
    }
}

/// The hex code, bucket, fine key, and percentage of a color
fn describe(color: &ScoredColor, options: &Options) -> String {
    format!(
        "{} {} / {} ({:.1}%)",
        format_color(color.color(), options),
        color.bucket,
        color.key,
        color.percentage()
    )
}

/// Print the dominant colors, the accent colors, and the combined summary
fn print_selection(selection: &Selection, meanings: &impl MeaningLookup, options: &Options) {
    if selection.dominants.is_empty() {
        println!("No dominant colors found");
    } else {
        println!("{}", "Dominant colors".bold());
        for (i, color) in selection.dominants.iter().enumerate() {
            println!("{}. {}", i + 1, describe(color, options));
            if let Some(meaning) = color.meaning(meanings) {
                if let Some(chakra) = &meaning.chakra {
                    println!("   Chakra: {chakra}");
                }
                if !meaning.short.is_empty() {
                    println!("   {}", meaning.short);
                }
                if !meaning.long.is_empty() {
                    println!("   {}", meaning.long.dimmed());
                }
            }
        }
    }

    if !selection.accents.is_empty() {
        println!();
        println!("{}", "Accent colors".bold());
        for color in &selection.accents {
            let short = color
                .meaning(meanings)
                .map(|meaning| meaning.short.as_str())
                .filter(|short| !short.is_empty());

            if let Some(short) = short {
                println!("- {}: {short}", describe(color, options));
            } else {
                println!("- {}", describe(color, options));
            }
        }
    }

    let summary = selection.summary(meanings);
    if !summary.is_empty() {
        println!();
        println!("{}", "Combined summary".bold());
        println!("{summary}");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use huecodex::{ColorKey, HueBucket};

    fn options(args: &[&str]) -> Options {
        Options::parse_from(["huecodex", "image.png"].iter().chain(args).copied())
    }

    fn quadrants(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            image::Rgb(match (x < width / 2, y < height / 2) {
                (true, true) => [255, 0, 0],
                (false, true) => [0, 255, 0],
                (true, false) => [0, 0, 255],
                (false, false) => [128, 128, 128],
            })
        })
    }

    #[test]
    fn staged_pipeline_matches_library() {
        let img = quadrants(1000, 600);
        let options = options(&["-d", "3", "-a", "1"]);

        let staged = analyze(&img, &options).unwrap();
        let direct = huecodex::analyze(&PixelBuffer::from_rgb_image(&img), &options.analysis_options());

        assert_eq!(staged, direct);

        let mut buckets = staged.dominants.iter().map(|color| color.bucket).collect::<Vec<_>>();
        buckets.sort();
        assert_eq!(buckets, vec![HueBucket::Red, HueBucket::Green, HueBucket::Blue]);
    }

    #[test]
    fn full_size_quadrants_have_no_accents() {
        let img = quadrants(10, 10);
        let selection = analyze(&img, &options(&["-d", "3", "-a", "1", "-p", "0"])).unwrap();

        assert_eq!(selection.dominants.len(), 3);
        assert!(selection.accents.is_empty());
    }

    #[test]
    fn empty_image_is_an_error() {
        let img = RgbImage::new(0, 4);
        assert!(matches!(analyze(&img, &options(&[])), Err(AppError::EmptyImage)));
    }

    #[test]
    fn format_plain_colors() {
        let red = Srgb::new(255, 0, 16);
        assert_eq!(format_color(red, &options(&[])), "#FF0010");
        assert_eq!(format_color(red, &options(&["-o", "rgb"])), "(255,0,16)");
    }

    #[test]
    fn load_meanings_file() {
        let path = std::env::temp_dir().join(format!("huecodex-meanings-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "Turquoise": { "short": "clarity", "chakra": "Throat" } }"#).unwrap();

        let table = load_meanings(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        let meaning = table.lookup(ColorKey::Turquoise.name()).unwrap();
        assert_eq!(meaning.short, "clarity");
        assert_eq!(meaning.chakra.as_deref(), Some("Throat"));
    }

    #[test]
    fn invalid_meanings_file() {
        let path = std::env::temp_dir().join(format!("huecodex-invalid-{}.json", std::process::id()));
        std::fs::write(&path, "[1, 2, 3]").unwrap();

        let result = load_meanings(&path);
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(result, Err(AppError::MeaningsParse(_))));
        assert!(matches!(
            load_meanings(Path::new("does/not/exist.json")),
            Err(AppError::MeaningsRead(_))
        ));
    }

    #[test]
    #[cfg(feature = "png")]
    fn load_png() {
        let path = std::env::temp_dir().join(format!("huecodex-image-{}.png", std::process::id()));
        quadrants(8, 8).save(&path).unwrap();

        let img = load_image(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(img.into_rgb8(), quadrants(8, 8));
    }
}
