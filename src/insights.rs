//! Derived figures shown next to every chart: shares, sums, means and the
//! handful of page-specific highlights.

use std::collections::{BTreeMap, BTreeSet};

use crate::models::{GenrePlatformTotal, PublisherTotal};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub sum: f64,
    pub mean: f64,
}

/// `None` for an empty input.
pub fn summarize<I>(values: I) -> Option<Summary>
where
    I: IntoIterator<Item = f64>,
{
    let (count, sum) = values
        .into_iter()
        .fold((0usize, 0.0), |(count, sum), v| (count + 1, sum + v));

    if count == 0 {
        return None;
    }

    Some(Summary {
        count,
        sum,
        mean: sum / count as f64,
    })
}

/// Percentage share of each value in hundredths of a percent.
///
/// Uses largest-remainder rounding so a non-zero total always yields exactly
/// 10 000 (100.00 %). Ties on the remainder go to the earlier row.
pub fn share_hundredths(values: &[f64]) -> Vec<i64> {
    let total: f64 = values.iter().filter(|v| **v > 0.0).sum();
    if total <= 0.0 {
        return vec![0; values.len()];
    }

    let raw: Vec<f64> = values
        .iter()
        .map(|v| v.max(0.0) / total * 10_000.0)
        .collect();
    let mut floors: Vec<i64> = raw.iter().map(|r| r.floor() as i64).collect();

    let mut by_remainder: Vec<usize> = (0..raw.len()).collect();
    by_remainder.sort_by(|&a, &b| {
        let ra = raw[a] - raw[a].floor();
        let rb = raw[b] - raw[b].floor();
        rb.total_cmp(&ra).then(a.cmp(&b))
    });

    let missing = 10_000 - floors.iter().sum::<i64>();
    for &i in by_remainder.iter().take(missing.max(0) as usize) {
        floors[i] += 1;
    }

    floors
}

/// Percentage shares rounded to two decimals, summing to 100.00.
pub fn shares(values: &[f64]) -> Vec<f64> {
    share_hundredths(values)
        .into_iter()
        .map(|h| h as f64 / 100.0)
        .collect()
}

pub fn head_sum(values: &[f64], n: usize) -> f64 {
    values.iter().take(n).sum()
}

/// Keeps the first `head` slices and folds the remainder into "Others".
pub fn fold_others(slices: &[(String, f64)], head: usize) -> Vec<(String, f64)> {
    let mut folded: Vec<(String, f64)> = slices.iter().take(head).cloned().collect();
    if slices.len() > head {
        let rest: f64 = slices.iter().skip(head).map(|(_, v)| v).sum();
        folded.push(("Others".to_string(), rest));
    }
    folded
}

/// Platforms ordered by their summed cross-tab total, largest first.
pub fn top_platforms(rows: &[GenrePlatformTotal], n: usize) -> Vec<String> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for row in rows {
        *totals.entry(row.platform.as_str()).or_default() += row.total_sales;
    }

    let mut ranked: Vec<(&str, f64)> = totals.into_iter().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(b.0)));
    ranked
        .into_iter()
        .take(n)
        .map(|(name, _)| name.to_string())
        .collect()
}

/// Platform selling the widest range of genres. Name order breaks ties.
pub fn most_diverse_platform(rows: &[GenrePlatformTotal]) -> Option<(String, usize)> {
    let mut genres: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for row in rows {
        genres
            .entry(row.platform.as_str())
            .or_default()
            .insert(row.genre.as_str());
    }

    genres
        .into_iter()
        .map(|(platform, set)| (platform, set.len()))
        .fold(None::<(&str, usize)>, |best, candidate| match best {
            Some(current) if current.1 >= candidate.1 => Some(current),
            _ => Some(candidate),
        })
        .map(|(platform, count)| (platform.to_string(), count))
}

/// Highest sales per released game. Publishers without games are skipped.
pub fn most_efficient_publisher(rows: &[PublisherTotal]) -> Option<(String, f64)> {
    rows.iter()
        .filter(|row| row.game_count > 0)
        .map(|row| (row, row.total_sales / row.game_count as f64))
        .fold(None::<(&PublisherTotal, f64)>, |best, candidate| match best {
            Some(current) if current.1 >= candidate.1 => Some(current),
            _ => Some(candidate),
        })
        .map(|(row, ratio)| (row.publisher.clone(), ratio))
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `1234.5` → `$1,234.50M`
pub fn format_millions(value: f64) -> String {
    format!("${}M", group_thousands(&format!("{value:.2}")))
}

/// `1234` → `1,234`
pub fn format_count(value: i64) -> String {
    group_thousands(&value.to_string())
}

fn group_thousands(number: &str) -> String {
    let (sign, unsigned) = match number.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", number),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((int_part, frac)) => (int_part, Some(frac)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}
