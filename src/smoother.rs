use nalgebra as na;
use ndarray::prelude::*;

use crate::config::SmoothingConfig;
use crate::error::Error;
use crate::math::{savgol_filter, savgol_matrix};
use crate::series::PersonSeries;

/// Savitzky-Golay smoother for person time series.
///
/// Each column is cut at absent values and every run longer than the window
/// is filtered on its own. Shorter runs and absent values are left as they
/// are.
#[derive(Debug, Clone)]
pub struct Smoother {
    window: usize,
    order: usize,
    weights: na::DMatrix<f64>,
}

impl Smoother {
    pub fn new(window: usize, order: usize) -> Result<Self, Error> {
        if window == 0 || window % 2 == 0 || order >= window {
            return Err(Error::InvalidSmoothing { window, order });
        }

        Ok(Self {
            window,
            order,
            weights: savgol_matrix(window, order),
        })
    }

    #[inline]
    pub fn from_config(config: &SmoothingConfig) -> Result<Self, Error> {
        Self::new(config.window, config.polyorder)
    }

    #[inline]
    pub fn window(&self) -> usize {
        self.window
    }

    #[inline]
    pub fn order(&self) -> usize {
        self.order
    }

    pub fn smooth(&self, series: &[PersonSeries]) -> Vec<PersonSeries> {
        series.iter().map(|s| self.smooth_series(s)).collect()
    }

    pub fn smooth_series(&self, series: &PersonSeries) -> PersonSeries {
        let mut smoothed = series.clone();

        for mut column in smoothed.data_mut().columns_mut() {
            self.smooth_column(&mut column);
        }

        smoothed
    }

    fn smooth_column(&self, column: &mut ArrayViewMut1<'_, Option<f32>>) {
        let n = column.len();
        let mut start = 0;

        while start < n {
            if column[start].is_none() {
                start += 1;
                continue;
            }

            let mut end = start;
            while end < n && column[end].is_some() {
                end += 1;
            }

            if end - start > self.window {
                let run: Vec<f64> = (start..end)
                    .filter_map(|i| column[i].map(f64::from))
                    .collect();

                for (i, v) in savgol_filter(&run, &self.weights).into_iter().enumerate() {
                    column[start + i] = Some(v as f32);
                }
            }

            start = end;
        }
    }
}
