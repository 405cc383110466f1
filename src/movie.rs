//! The sample record type: a movie keyed by release year and title

use crate::{
    attr::{take_number, take_string, Attr, AttrType, Item},
    error::SerializationError,
    record::Record,
};
use std::iter::FromIterator;

#[derive(Debug, Clone, PartialEq)]
pub struct Movie {
    pub year: i64,
    pub title: String,
    pub plot: String,
    pub rating: f64,
}

impl Movie {
    pub fn new(
        year: i64,
        title: impl AsRef<str>,
        plot: impl AsRef<str>,
        rating: f64,
    ) -> Self {
        Self {
            year,
            title: title.as_ref().into(),
            plot: plot.as_ref().into(),
            rating,
        }
    }
}

impl Record for Movie {
    const PARTITION_KEY: &'static str = "Year";
    const SORT_KEY: &'static str = "Title";

    fn partition_key(&self) -> i64 {
        self.year
    }

    fn sort_key(&self) -> &str {
        &self.title
    }

    fn to_item(&self) -> Result<Item, SerializationError> {
        Ok(Item::from_iter([
            ("Year".to_string(), Attr::from(self.year)),
            ("Title".to_string(), Attr::from(self.title.as_str())),
            ("Plot".to_string(), Attr::from(self.plot.as_str())),
            ("Rating".to_string(), Attr::number("Rating", self.rating)?),
        ]))
    }

    fn from_item(mut item: Item) -> Result<Self, SerializationError> {
        Ok(Movie {
            year: take_number(&mut item, "Year")?,
            title: take_string(&mut item, "Title")?,
            plot: take_string(&mut item, "Plot")?,
            rating: take_number(&mut item, "Rating")?,
        })
    }

    fn field_type(name: &str) -> Option<AttrType> {
        match name {
            "Year" | "Rating" => Some(AttrType::N),
            "Title" | "Plot" => Some(AttrType::S),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn movie_maps_to_attributes() -> Result<(), Box<dyn Error>> {
        let item = Movie::new(2017, "Hello", "Action", 3.0).to_item()?;
        assert_eq!(item.get("Year"), Some(&Attr::N("2017".into())));
        assert_eq!(item.get("Title"), Some(&Attr::S("Hello".into())));
        assert_eq!(item.get("Plot"), Some(&Attr::S("Action".into())));
        assert_eq!(item.get("Rating"), Some(&Attr::N("3".into())));
        Ok(())
    }

    #[test]
    fn movie_reads_back_from_wire_item() -> Result<(), Box<dyn Error>> {
        let item: Item = serde_json::from_str(
            r#"{"Year":{"N":"2015"},"Title":{"S":"The Big New Movie"},"Plot":{"S":"Nothing happens at all."},"Rating":{"N":"0.5"}}"#,
        )?;
        assert_eq!(
            Movie::from_item(item)?,
            Movie::new(2015, "The Big New Movie", "Nothing happens at all.", 0.5)
        );
        Ok(())
    }

    #[test]
    fn field_types_match_what_from_item_reads() {
        assert_eq!(Movie::field_type("Rating"), Some(AttrType::N));
        assert_eq!(Movie::field_type("Plot"), Some(AttrType::S));
        assert_eq!(Movie::field_type("Director"), None);
    }

    #[test]
    fn nan_rating_is_a_serialization_error() {
        assert!(matches!(
            Movie::new(2017, "Hello", "Action", f64::NAN).to_item(),
            Err(SerializationError::NonFiniteNumber(_))
        ));
    }

    #[test]
    fn incomplete_item_is_a_serialization_error() {
        let mut item = Item::new();
        item.insert("Year".into(), Attr::from(2017_i64));
        item.insert("Title".into(), Attr::from("Hello"));
        assert!(matches!(
            Movie::from_item(item),
            Err(SerializationError::MissingAttribute(name)) if name == "Plot"
        ));
    }
}
