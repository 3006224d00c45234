// Columnar observation table shared by all pipeline stages
use chrono::NaiveDateTime;
use std::collections::BTreeMap;

/// A table of observations: one timestamp index plus named value channels.
/// Every channel holds exactly one entry per timestamp; cells with no
/// reading are `None`. Timestamps are not required to be sorted or unique
/// on construction; call [`Frame::sort_by_time`] before any stage that
/// uses them as the ordering key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub timestamps: Vec<NaiveDateTime>,
    pub channels: BTreeMap<String, Vec<Option<f64>>>,
}

impl Frame {
    /// An empty frame carrying the given channel names.
    pub fn with_channels<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let channels = names.into_iter().map(|n| (n.into(), Vec::new())).collect();
        Self {
            timestamps: Vec::new(),
            channels,
        }
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn channel(&self, name: &str) -> Option<&[Option<f64>]> {
        self.channels.get(name).map(Vec::as_slice)
    }

    pub fn channel_names(&self) -> impl Iterator<Item = &str> {
        self.channels.keys().map(String::as_str)
    }

    /// A new frame holding the rows at `indices`, in that order, with the
    /// same channels.
    pub fn select_rows(&self, indices: &[usize]) -> Frame {
        let timestamps = indices.iter().map(|&i| self.timestamps[i]).collect();
        let channels = self
            .channels
            .iter()
            .map(|(name, column)| {
                let selected = indices.iter().map(|&i| column[i]).collect();
                (name.clone(), selected)
            })
            .collect();
        Frame {
            timestamps,
            channels,
        }
    }

    /// Stable sort of all rows by timestamp. Rows with equal timestamps
    /// keep their original relative order.
    pub fn sort_by_time(&mut self) {
        let mut order: Vec<usize> = (0..self.len()).collect();
        order.sort_by_key(|&i| self.timestamps[i]);
        if order.iter().enumerate().all(|(position, &i)| position == i) {
            return;
        }
        *self = self.select_rows(&order);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_sort_by_time_permutes_channels_with_timestamps() {
        let mut frame = Frame {
            timestamps: vec![
                dt("2024-05-02 10:00:00"),
                dt("2024-05-01 10:00:00"),
                dt("2024-05-03 10:00:00"),
            ],
            channels: BTreeMap::from([(
                "COUNT_TIME_1".to_string(),
                vec![Some(2.0), Some(1.0), Some(3.0)],
            )]),
        };

        frame.sort_by_time();

        assert_eq!(
            frame.timestamps,
            vec![
                dt("2024-05-01 10:00:00"),
                dt("2024-05-02 10:00:00"),
                dt("2024-05-03 10:00:00"),
            ]
        );
        assert_eq!(
            frame.channel("COUNT_TIME_1").unwrap(),
            &[Some(1.0), Some(2.0), Some(3.0)]
        );
    }

    #[test]
    fn test_sort_is_stable_for_duplicate_timestamps() {
        let mut frame = Frame {
            timestamps: vec![dt("2024-05-01 10:00:00"), dt("2024-05-01 10:00:00")],
            channels: BTreeMap::from([("v".to_string(), vec![Some(1.0), Some(2.0)])]),
        };

        frame.sort_by_time();

        assert_eq!(frame.channel("v").unwrap(), &[Some(1.0), Some(2.0)]);
    }

    #[test]
    fn test_select_rows_keeps_channel_names_when_empty() {
        let frame = Frame::with_channels(["a", "b"]);
        let selected = frame.select_rows(&[]);
        assert!(selected.is_empty());
        assert_eq!(selected.channel_names().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
