use crate::error::{DataLoadError, FilterError};
use crate::filter::Filters;
use crate::loader::{load_dataset, Dataset};
use crate::types::{DateRange, Season, WeatherCondition};
use crate::view::{build_view, View, ViewReport};
use chrono::NaiveDate;
use log::info;
use once_cell::unsync::OnceCell;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// One dashboard session: the dataset, loaded at most once, plus the
/// current view and filter selections.
///
/// Changing the view or the filters never touches the dataset; every
/// [`Session::render`] recomputes from the cached table.
pub struct Session {
    data_path: PathBuf,
    dataset: OnceCell<Dataset>,
    view: View,
    filters: Filters,
    initial_filters: Filters,
}

impl Session {
    pub fn new(data_path: impl Into<PathBuf>, view: View, filters: Filters) -> Self {
        Self {
            data_path: data_path.into(),
            dataset: OnceCell::new(),
            view,
            initial_filters: filters.clone(),
            filters,
        }
    }

    /// A session over an already loaded dataset.
    #[cfg(test)]
    pub fn with_dataset(dataset: Dataset, view: View, filters: Filters) -> Self {
        let session = Self::new(dataset.report().source.clone(), view, filters);
        let _ = session.dataset.set(dataset);
        session
    }

    /// The session's table, reading the file on first use only.
    pub fn dataset(&self) -> Result<&Dataset, DataLoadError> {
        self.dataset.get_or_try_init(|| load_dataset(&self.data_path))
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    pub fn select_view(&mut self, view: View) {
        info!("view -> {}", view.title());
        self.view = view;
    }

    pub fn set_range(&mut self, start: NaiveDate, end: NaiveDate) -> Result<(), FilterError> {
        self.filters.range = DateRange::new(start, end)?;
        Ok(())
    }

    pub fn set_weather(&mut self, weather: BTreeSet<WeatherCondition>) {
        self.filters.weather = weather;
    }

    pub fn set_seasons(&mut self, seasons: BTreeSet<Season>) {
        self.filters.seasons = seasons;
    }

    /// Restore the filters the session started with.
    pub fn reset_filters(&mut self) {
        self.filters = self.initial_filters.clone();
    }

    /// Run the filter -> aggregate pass for the current view.
    pub fn render(&self) -> Result<ViewReport, DataLoadError> {
        let dataset = self.dataset()?;
        Ok(build_view(self.view, dataset.records(), &self.filters))
    }
}
