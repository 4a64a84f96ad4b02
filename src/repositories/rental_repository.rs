use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Unable to read dataset {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },
}

/// One row of the cleaned rentals extract.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Rental {
    pub car_id: String,
    pub checkin_type: String,
    pub state: String,
    #[serde(default)]
    pub delay: String,
    #[serde(default)]
    pub delay_range: String,
    #[serde(default)]
    pub delay_at_checkout_in_minutes: Option<f64>,
}

/// One row of the cleaned successive-rental pairs extract.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct SuccessiveRental {
    #[serde(rename = "time_delta_with_previous_rental_in_minutes_t")]
    pub time_delta_bucket: String,
    pub delay_status: String,
    pub state: String,
}

#[derive(Debug, Clone, Default)]
pub struct RentalDatasets {
    pub rentals: Vec<Rental>,
    /// Row count of the raw successive-rental pairs extract.
    pub successive_count: usize,
    pub successive: Vec<SuccessiveRental>,
}

pub struct RentalRepository {
    rentals_path: PathBuf,
    successive_path: PathBuf,
    successive_clean_path: PathBuf,
}

impl RentalRepository {
    pub fn new<P: AsRef<Path>>(rentals_path: P, successive_path: P, successive_clean_path: P) -> Self {
        Self {
            rentals_path: rentals_path.as_ref().to_path_buf(),
            successive_path: successive_path.as_ref().to_path_buf(),
            successive_clean_path: successive_clean_path.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self) -> Result<RentalDatasets, DatasetError> {
        let rentals = read_rows(&self.rentals_path)?;
        let successive_count = count_rows(&self.successive_path)?;
        let successive = read_rows(&self.successive_clean_path)?;

        info!(
            "Loaded {} rentals, {} successive pairs ({} after cleaning)",
            rentals.len(),
            successive_count,
            successive.len()
        );
        Ok(RentalDatasets {
            rentals,
            successive_count,
            successive,
        })
    }
}

fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, DatasetError> {
    let to_error = |source| DatasetError::Csv {
        path: path.to_path_buf(),
        source,
    };
    csv::Reader::from_path(path)
        .map_err(to_error)?
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(to_error)
}

fn count_rows(path: &Path) -> Result<usize, DatasetError> {
    let to_error = |source| DatasetError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::Reader::from_path(path).map_err(to_error)?;
    let mut count = 0;
    for record in reader.records() {
        record.map_err(to_error)?;
        count += 1;
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn loads_all_three_extracts() {
        let dir = tempfile::tempdir().unwrap();
        let rentals = dir.path().join("dataset_clean.csv");
        let joined = dir.path().join("dataset_join.csv");
        let joined_clean = dir.path().join("dataset_join_clean.csv");

        fs::write(
            &rentals,
            "rental_id,car_id,checkin_type,state,delay_at_checkout_in_minutes,delay,delay_range\n\
             1,10,mobile,ended,45.0,Late,30min to 1h late\n\
             2,10,connect,canceled,,Unknown,Unknown\n\
             3,11,connect,ended,-12,In advance,On time\n",
        )
        .unwrap();
        fs::write(&joined, "rental_id,previous_ended_rental_id\n2,1\n3,2\n").unwrap();
        fs::write(
            &joined_clean,
            "rental_id,time_delta_with_previous_rental_in_minutes_t,delay_status,state\n\
             2,Up to 30min,Impacted,canceled\n",
        )
        .unwrap();

        let datasets = RentalRepository::new(&rentals, &joined, &joined_clean)
            .load()
            .unwrap();

        assert_eq!(datasets.rentals.len(), 3);
        assert_eq!(datasets.rentals[0].delay_at_checkout_in_minutes, Some(45.0));
        assert_eq!(datasets.rentals[1].delay_at_checkout_in_minutes, None);
        assert_eq!(datasets.rentals[2].delay_range, "On time");
        assert_eq!(datasets.successive_count, 2);
        assert_eq!(datasets.successive[0].time_delta_bucket, "Up to 30min");
        assert_eq!(datasets.successive[0].delay_status, "Impacted");
    }

    #[test]
    fn unparsable_delay_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let rentals = dir.path().join("dataset_clean.csv");
        let joined = dir.path().join("dataset_join.csv");
        let joined_clean = dir.path().join("dataset_join_clean.csv");

        fs::write(
            &rentals,
            "car_id,checkin_type,state,delay_at_checkout_in_minutes,delay,delay_range\n\
             1,mobile,ended,oops,Late,Up to 30min late\n",
        )
        .unwrap();
        fs::write(&joined, "rental_id\n").unwrap();
        fs::write(
            &joined_clean,
            "time_delta_with_previous_rental_in_minutes_t,delay_status,state\n",
        )
        .unwrap();

        let err = RentalRepository::new(&rentals, &joined, &joined_clean)
            .load()
            .unwrap_err();
        assert!(err.to_string().contains("dataset_clean.csv"));
    }

    #[test]
    fn missing_extract_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let absent = dir.path().join("absent.csv");

        let err = RentalRepository::new(&absent, &absent, &absent)
            .load()
            .unwrap_err();
        assert!(err.to_string().contains("absent.csv"));
    }
}
