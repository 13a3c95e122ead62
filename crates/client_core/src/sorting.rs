//! Article ordering. Every function returns a new vector and leaves its input
//! alone, so the displayed list and a saved snapshot never share a buffer.

use std::cmp::Ordering;

use shared::domain::{Article, SortColumn, SortDirection, Window};

fn sort_key(article: &Article, column: SortColumn) -> Option<f64> {
    match column {
        SortColumn::Words => Some(article.words),
        SortColumn::PublishAt => article.publish_timestamp().map(|ts| ts as f64),
    }
}

/// Articles without a usable key go last in either direction.
fn compare(a: &Article, b: &Article, direction: SortDirection, column: SortColumn) -> Ordering {
    match (sort_key(a, column), sort_key(b, column)) {
        (Some(a), Some(b)) => match direction {
            SortDirection::Asc => a.total_cmp(&b),
            SortDirection::Desc => b.total_cmp(&a),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn sort_articles(
    articles: &[Article],
    direction: SortDirection,
    column: SortColumn,
) -> Vec<Article> {
    let mut sorted = articles.to_vec();
    sorted.sort_by(|a, b| compare(a, b, direction, column));
    sorted
}

/// Sorts only `window`; articles outside it are not part of the result.
pub fn sort_window(
    articles: &[Article],
    window: Window,
    direction: SortDirection,
    column: SortColumn,
) -> Vec<Article> {
    sort_articles(window.slice(articles), direction, column)
}

/// Ordering produced by a column-header click. Ascending reorders the whole
/// list; descending keeps only the visible window.
pub fn apply_sort_click(
    articles: &[Article],
    visible: Window,
    direction: SortDirection,
    column: SortColumn,
) -> Vec<Article> {
    match direction {
        SortDirection::Asc => sort_articles(articles, direction, column),
        SortDirection::Desc => sort_window(articles, visible, direction, column),
    }
}

/// Re-applies a persisted sort to the whole list. No order, no reorder.
pub fn resort(articles: &[Article], order: Option<(SortDirection, SortColumn)>) -> Vec<Article> {
    match order {
        Some((direction, column)) => sort_articles(articles, direction, column),
        None => articles.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::domain::Profile;

    fn article(title: &str, words: u64, publish_at: &str) -> Article {
        Article {
            title: title.to_string(),
            image: String::new(),
            profile: Profile {
                first_name: "Ida".to_string(),
                last_name: "Wells".to_string(),
            },
            words: words as f64,
            publish_at: publish_at.to_string(),
        }
    }

    fn titles(articles: &[Article]) -> Vec<&str> {
        articles.iter().map(|a| a.title.as_str()).collect()
    }

    #[test]
    fn publish_dates_sort_chronologically() {
        let input = vec![
            article("b", 1, "20230101"),
            article("a", 1, "20220101"),
            article("c", 1, "20240101"),
        ];
        let asc = sort_articles(&input, SortDirection::Asc, SortColumn::PublishAt);
        assert_eq!(titles(&asc), ["a", "b", "c"]);
        let desc = sort_articles(&input, SortDirection::Desc, SortColumn::PublishAt);
        assert_eq!(titles(&desc), ["c", "b", "a"]);
        assert_eq!(titles(&input), ["b", "a", "c"], "input must stay untouched");
    }

    #[test]
    fn words_sort_numerically_not_lexically() {
        let input = vec![
            article("nine", 9, "20200101"),
            article("eleven-hundred", 1100, "20200101"),
            article("eighty", 80, "20200101"),
        ];
        let asc = sort_articles(&input, SortDirection::Asc, SortColumn::Words);
        assert_eq!(titles(&asc), ["nine", "eighty", "eleven-hundred"]);
    }

    #[test]
    fn fractional_and_negative_word_counts_order_as_floats() {
        let input: Vec<Article> = serde_json::from_str(
            r#"[
                {"title":"low","image":"","profile":{"first_name":"A","last_name":"B"},"words":10.7,"publish_at":"20200101"},
                {"title":"high","image":"","profile":{"first_name":"A","last_name":"B"},"words":10.2,"publish_at":"20200101"},
                {"title":"negative","image":"","profile":{"first_name":"A","last_name":"B"},"words":-3,"publish_at":"20200101"}
            ]"#,
        )
        .expect("decode");
        let asc = sort_articles(&input, SortDirection::Asc, SortColumn::Words);
        assert_eq!(titles(&asc), ["negative", "high", "low"]);
        let desc = sort_articles(&input, SortDirection::Desc, SortColumn::Words);
        assert_eq!(titles(&desc), ["low", "high", "negative"]);
    }

    #[test]
    fn unparseable_dates_go_last_both_ways() {
        let input = vec![
            article("bad", 1, "soon"),
            article("old", 1, "19990101"),
            article("new", 1, "20250101"),
        ];
        let asc = sort_articles(&input, SortDirection::Asc, SortColumn::PublishAt);
        assert_eq!(titles(&asc), ["old", "new", "bad"]);
        let desc = sort_articles(&input, SortDirection::Desc, SortColumn::PublishAt);
        assert_eq!(titles(&desc), ["new", "old", "bad"]);
    }

    #[test]
    fn equal_keys_keep_their_relative_order() {
        let input = vec![
            article("first", 500, "20200101"),
            article("second", 500, "20200101"),
            article("small", 5, "20200101"),
        ];
        let asc = sort_articles(&input, SortDirection::Asc, SortColumn::Words);
        assert_eq!(titles(&asc), ["small", "first", "second"]);
    }

    #[test]
    fn descending_click_keeps_only_the_visible_window() {
        let input = vec![
            article("w1", 1, "20200101"),
            article("w2", 2, "20200101"),
            article("w3", 3, "20200101"),
            article("hidden", 99, "20200101"),
        ];
        let sorted = apply_sort_click(
            &input,
            Window::new(0, 3),
            SortDirection::Desc,
            SortColumn::Words,
        );
        assert_eq!(titles(&sorted), ["w3", "w2", "w1"]);

        let ascending = apply_sort_click(
            &input,
            Window::new(0, 3),
            SortDirection::Asc,
            SortColumn::Words,
        );
        assert_eq!(titles(&ascending), ["w1", "w2", "w3", "hidden"]);
    }

    #[test]
    fn resort_without_order_is_identity() {
        let input = vec![article("z", 9, "20200101"), article("a", 1, "20190101")];
        assert_eq!(resort(&input, None), input);
    }
}
