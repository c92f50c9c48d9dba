use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "feedback_sentiment", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "positive" => Ok(Sentiment::Positive),
            "neutral" => Ok(Sentiment::Neutral),
            "negative" => Ok(Sentiment::Negative),
            _ => Err(format!("Unknown sentiment: {}", s)),
        }
    }
}

/// Map a rating to its sentiment bucket. Callers guarantee the rating is
/// within [1,5]; the mapping is total over that range.
pub fn classify(rating: i16) -> Sentiment {
    if rating >= 4 {
        Sentiment::Positive
    } else if rating <= 2 {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedbackSummary {
    pub count: u64,
    /// `None` (JSON null) when there is no feedback; zero would read as a
    /// real negative signal.
    pub average_rating: Option<f64>,
    pub positive_count: u64,
    pub neutral_count: u64,
    pub negative_count: u64,
}

pub fn aggregate(ratings: &[i16]) -> FeedbackSummary {
    let count = ratings.len() as u64;
    let mut positive = 0u64;
    let mut neutral = 0u64;
    let mut negative = 0u64;
    let mut sum = 0i64;

    for rating in ratings {
        sum += i64::from(*rating);
        match classify(*rating) {
            Sentiment::Positive => positive += 1,
            Sentiment::Neutral => neutral += 1,
            Sentiment::Negative => negative += 1,
        }
    }

    let average_rating = if count == 0 {
        None
    } else {
        Some(sum as f64 / count as f64)
    };

    FeedbackSummary {
        count,
        average_rating,
        positive_count: positive,
        neutral_count: neutral,
        negative_count: negative,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_buckets() {
        assert_eq!(classify(1), Sentiment::Negative);
        assert_eq!(classify(2), Sentiment::Negative);
        assert_eq!(classify(3), Sentiment::Neutral);
        assert_eq!(classify(4), Sentiment::Positive);
        assert_eq!(classify(5), Sentiment::Positive);
    }

    #[test]
    fn aggregate_mixed_ratings() {
        let summary = aggregate(&[5, 4, 3, 1]);
        assert_eq!(summary.count, 4);
        assert_eq!(summary.positive_count, 2);
        assert_eq!(summary.neutral_count, 1);
        assert_eq!(summary.negative_count, 1);
        assert!((summary.average_rating.unwrap() - 3.25).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_aggregate_has_null_average() {
        let summary = aggregate(&[]);
        assert_eq!(summary.count, 0);
        assert_eq!(summary.average_rating, None);
        assert_eq!(summary.positive_count, 0);
    }

    #[test]
    fn empty_average_serializes_as_null() {
        let json = serde_json::to_value(aggregate(&[])).unwrap();
        assert!(json["average_rating"].is_null());
    }

    #[test]
    fn sentiment_parse_round_trip() {
        for sentiment in [Sentiment::Positive, Sentiment::Neutral, Sentiment::Negative] {
            assert_eq!(sentiment.as_str().parse::<Sentiment>().unwrap(), sentiment);
        }
        assert!("ambivalent".parse::<Sentiment>().is_err());
    }
}
