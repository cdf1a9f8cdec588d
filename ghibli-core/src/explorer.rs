//! Movie grid: free-text search plus a single active filter chip.

use std::str::FromStr;

use crate::models::film::truncate_chars;
use crate::models::{Film, Loose};

pub const CARD_DESCRIPTION_LIMIT: usize = 180;
pub const EMPTY_MESSAGE: &str = "No films match just yet – try another filter.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GridFilter {
    #[default]
    All,
    /// Rotten Tomatoes score of 90 or more.
    Rt90,
    /// Released before 2000.
    Classic,
    /// Released in 2000 or later.
    Modern,
}

impl FromStr for GridFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(GridFilter::All),
            "rt90" => Ok(GridFilter::Rt90),
            "classic" => Ok(GridFilter::Classic),
            "modern" => Ok(GridFilter::Modern),
            other => Err(format!("unknown filter: {}", other)),
        }
    }
}

impl GridFilter {
    pub fn matches(&self, film: &Film) -> bool {
        let year = film.year().and_then(Loose::as_i64);
        let score = film.rt_score().and_then(Loose::as_i64);
        match self {
            GridFilter::All => true,
            GridFilter::Rt90 => score.is_some_and(|s| s >= 90),
            GridFilter::Classic => year.is_some_and(|y| y < 2000),
            GridFilter::Modern => year.is_some_and(|y| y >= 2000),
        }
    }
}

fn matches_query(film: &Film, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let year = film.year().map(|y| y.to_string());
    let hit = [
        Some(film.title.as_str()),
        Some(film.description.as_str()),
        film.director(),
        year.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(query));
    hit
}

/// Films matching both the search text and the filter chip, in snapshot order.
pub fn filter_films<'a>(films: &'a [Film], query: &str, filter: GridFilter) -> Vec<&'a Film> {
    let query = query.trim().to_lowercase();
    films
        .iter()
        .filter(|f| matches_query(f, &query))
        .filter(|f| filter.matches(f))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridCard {
    pub title: String,
    pub image: Option<String>,
    pub description: String,
    pub chips: Vec<String>,
}

impl From<&Film> for GridCard {
    fn from(film: &Film) -> Self {
        Self {
            title: film.title.clone(),
            image: film.image_url().map(str::to_string),
            description: truncate_chars(&film.description, CARD_DESCRIPTION_LIMIT),
            chips: film.chips(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn film(title: &str, year: Loose, score: Option<Loose>, director: &str) -> Film {
        Film {
            title: title.to_string(),
            description: format!("{} description", title),
            year: Some(year),
            rt_score: score,
            director: Some(director.to_string()),
            ..Default::default()
        }
    }

    fn catalog() -> Vec<Film> {
        vec![
            film("Castle in the Sky", Loose::Int(1986), Some(Loose::Text("95".into())), "Hayao Miyazaki"),
            film("Grave of the Fireflies", Loose::Text("1988".into()), Some(Loose::Int(97)), "Isao Takahata"),
            film("Ponyo", Loose::Int(2008), Some(Loose::Int(89)), "Hayao Miyazaki"),
            film("Earwig and the Witch", Loose::Text("2020".into()), None, "Gorō Miyazaki"),
            film("Lost Reel", Loose::Text("unknown".into()), Some(Loose::Text("n/a".into())), "Nobody"),
        ]
    }

    fn titles(films: &[&Film]) -> Vec<String> {
        films.iter().map(|f| f.title.clone()).collect()
    }

    #[test]
    fn all_with_empty_query_returns_everything() {
        let films = catalog();
        assert_eq!(filter_films(&films, "  ", GridFilter::All).len(), 5);
    }

    #[test]
    fn chips_exclude_unparsable_values() {
        let films = catalog();
        assert_eq!(
            titles(&filter_films(&films, "", GridFilter::Rt90)),
            vec!["Castle in the Sky", "Grave of the Fireflies"]
        );
        assert_eq!(
            titles(&filter_films(&films, "", GridFilter::Classic)),
            vec!["Castle in the Sky", "Grave of the Fireflies"]
        );
        assert_eq!(
            titles(&filter_films(&films, "", GridFilter::Modern)),
            vec!["Ponyo", "Earwig and the Witch"]
        );
    }

    #[test]
    fn search_covers_title_director_and_year() {
        let films = catalog();
        assert_eq!(
            titles(&filter_films(&films, "TAKAHATA", GridFilter::All)),
            vec!["Grave of the Fireflies"]
        );
        assert_eq!(
            titles(&filter_films(&films, "2008", GridFilter::All)),
            vec!["Ponyo"]
        );
        assert_eq!(
            titles(&filter_films(&films, "miyazaki", GridFilter::Classic)),
            vec!["Castle in the Sky"]
        );
        assert!(filter_films(&films, "totoro", GridFilter::All).is_empty());
    }

    #[test]
    fn filter_names_parse() {
        assert_eq!("RT90".parse::<GridFilter>(), Ok(GridFilter::Rt90));
        assert_eq!("".parse::<GridFilter>(), Ok(GridFilter::All));
        assert!("newest".parse::<GridFilter>().is_err());
    }

    #[test]
    fn grid_card_truncates_at_180() {
        let mut f = catalog().remove(0);
        f.description = "y".repeat(200);
        let card = GridCard::from(&f);
        assert_eq!(card.description.chars().count(), CARD_DESCRIPTION_LIMIT + 1);
        assert_eq!(card.chips[0], "1986");
    }
}
