//! Raw trip pagination.

use crate::error::Result;
use crate::models::Dataset;
use crate::report::render_trips;
use crate::session::prompt::Prompter;
use std::io::{BufRead, Write};
use tracing::debug;

/// Show successive pages of `dataset` for as long as the user answers yes.
///
/// Stops on any other answer or once every trip has been shown. Returns the
/// number of pages printed.
pub fn view_raw_data<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    dataset: &Dataset,
    page_size: usize,
) -> Result<usize> {
    if dataset.is_empty() {
        return Ok(0);
    }

    let question = format!(
        "\nWould you like to view {} rows of individual trip data? Enter yes or no",
        page_size
    );
    let mut offset = 0;
    let mut pages = 0;

    while prompter.confirm(&question)? {
        let page = dataset.page(offset, page_size);
        prompter.say(&render_trips(page, offset, dataset.has_demographics()))?;
        offset += page.len();
        pages += 1;

        if offset >= dataset.len() {
            prompter.say("\nNo more trip data to display.\n")?;
            break;
        }
    }

    debug!("Showed {} pages ({} trips)", pages, offset);
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::tests::fixture_loader;
    use std::io::Cursor;

    fn run(input: &str, city: &str, page_size: usize) -> (usize, String) {
        let dataset = fixture_loader().load_named(city, "all", "all").unwrap();
        let mut prompter = Prompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new());
        let pages = view_raw_data(&mut prompter, &dataset, page_size).unwrap();
        (pages, String::from_utf8(prompter.into_output()).unwrap())
    }

    #[test]
    fn test_pages_advance_on_yes() {
        let (pages, output) = run("yes\nyes\nno\n", "chicago", 3);

        assert_eq!(pages, 2);
        assert!(output.contains("view 3 rows"));
        // rows 0..6 shown, row 6 is not
        assert!(output.lines().any(|l| l.starts_with("5 ")));
        assert!(!output.lines().any(|l| l.starts_with("6 ")));
    }

    #[test]
    fn test_stops_on_anything_but_yes() {
        let (pages, output) = run("maybe\nyes\n", "chicago", 5);
        assert_eq!(pages, 0);
        assert!(!output.contains("Start Station"));
    }

    #[test]
    fn test_stops_when_exhausted() {
        let (pages, output) = run("yes\nyes\nyes\n", "washington", 5);
        assert_eq!(pages, 1);
        assert!(output.contains("No more trip data to display."));
        assert_eq!(output.matches("Would you like to view").count(), 1);
    }

    #[test]
    fn test_empty_dataset_is_not_offered() {
        let dataset = fixture_loader()
            .load_named("chicago", "june", "tuesday")
            .unwrap();
        let mut prompter = Prompter::new(Cursor::new(b"yes\n".to_vec()), Vec::new());

        assert_eq!(view_raw_data(&mut prompter, &dataset, 5).unwrap(), 0);
        assert!(prompter.into_output().is_empty());
    }
}
