//! Enrichment orchestration
//!
//! Sequences the three lookups for a pair of capture coordinates:
//! reverse geocoding, then weather, then nearby places. Lookups are not
//! parallelized; the first failure aborts the remaining branches and is
//! surfaced to the caller. Fetched place elements are classified into
//! route/attraction buckets; unnamed or unmatched elements are dropped
//! silently.

use std::sync::Arc;

use tracing::info;

use super::{PlaceDirectory, ReverseGeocoder, WeatherProvider};
use crate::errors::CollaboratorError;
use crate::models::{ClassifiedPlaces, EnrichmentResult, PlaceCategory, PlaceElement};

#[derive(Clone)]
pub struct EnrichmentService {
    geocoder: Arc<dyn ReverseGeocoder>,
    weather: Arc<dyn WeatherProvider>,
    places: Arc<dyn PlaceDirectory>,
}

impl EnrichmentService {
    pub fn new(
        geocoder: Arc<dyn ReverseGeocoder>,
        weather: Arc<dyn WeatherProvider>,
        places: Arc<dyn PlaceDirectory>,
    ) -> Self {
        Self {
            geocoder,
            weather,
            places,
        }
    }

    pub async fn enrich(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<EnrichmentResult, CollaboratorError> {
        let location = self.geocoder.reverse(latitude, longitude).await?;
        let weather = self.weather.current(latitude, longitude).await?;
        let elements = self.places.nearby(latitude, longitude).await?;
        let places = classify(elements);

        info!(
            "Enrichment complete for {latitude},{longitude}: {} hiking, {} bicycle, {} mtb, {} attractions",
            places.hiking.len(),
            places.bicycle.len(),
            places.mountain_bike.len(),
            places.attractions.len()
        );

        Ok(EnrichmentResult {
            location,
            weather,
            places,
        })
    }
}

/// Bucket a single element by its route/tourism tag. `None` means the
/// element is dropped: it has no usable name or matches no bucket.
pub fn categorize(element: &PlaceElement) -> Option<PlaceCategory> {
    element.name()?;
    match (
        element.tags.get("route").map(String::as_str),
        element.tags.get("tourism").map(String::as_str),
    ) {
        (Some("hiking"), _) => Some(PlaceCategory::Hiking),
        (Some("bicycle"), _) => Some(PlaceCategory::Bicycle),
        (Some("mtb"), _) => Some(PlaceCategory::MountainBike),
        (_, Some("attraction")) => Some(PlaceCategory::Attraction),
        _ => None,
    }
}

/// Classify fetched elements into the route/attraction buckets.
pub fn classify(elements: Vec<PlaceElement>) -> ClassifiedPlaces {
    let mut classified = ClassifiedPlaces::default();
    for element in elements {
        match categorize(&element) {
            Some(PlaceCategory::Hiking) => classified.hiking.push(element),
            Some(PlaceCategory::Bicycle) => classified.bicycle.push(element),
            Some(PlaceCategory::MountainBike) => classified.mountain_bike.push(element),
            Some(PlaceCategory::Attraction) => classified.attractions.push(element),
            None => {}
        }
    }
    classified
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LocationEnrichment, WeatherSnapshot};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn element(tags: &[(&str, &str)]) -> PlaceElement {
        PlaceElement {
            element_type: "node".into(),
            id: 1,
            lat: Some(47.5),
            lon: Some(11.1),
            tags: tags
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            nodes: vec![],
            members: vec![],
        }
    }

    #[test]
    fn named_route_and_tourism_tags_are_bucketed_exactly() {
        assert_eq!(
            categorize(&element(&[("route", "hiking"), ("name", "Ridge Trail")])),
            Some(PlaceCategory::Hiking)
        );
        assert_eq!(
            categorize(&element(&[("route", "bicycle"), ("name", "Valley Loop")])),
            Some(PlaceCategory::Bicycle)
        );
        assert_eq!(
            categorize(&element(&[("route", "mtb"), ("name", "Rock Garden")])),
            Some(PlaceCategory::MountainBike)
        );
        assert_eq!(
            categorize(&element(&[("tourism", "attraction"), ("name", "Old Mill")])),
            Some(PlaceCategory::Attraction)
        );
    }

    #[test]
    fn unnamed_elements_are_dropped_regardless_of_tags() {
        assert_eq!(categorize(&element(&[("route", "hiking")])), None);
        assert_eq!(categorize(&element(&[("tourism", "attraction")])), None);
        assert_eq!(
            categorize(&element(&[("route", "hiking"), ("name", "")])),
            None
        );
    }

    #[test]
    fn unmatched_tag_values_are_dropped() {
        assert_eq!(
            categorize(&element(&[("route", "bus"), ("name", "Line 4")])),
            None
        );
        assert_eq!(
            categorize(&element(&[("tourism", "hotel"), ("name", "Alpenhof")])),
            None
        );
    }

    #[test]
    fn classify_partitions_into_all_four_buckets() {
        let classified = classify(vec![
            element(&[("route", "hiking"), ("name", "Ridge Trail")]),
            element(&[("route", "mtb"), ("name", "Rock Garden")]),
            element(&[("tourism", "attraction"), ("name", "Old Mill")]),
            element(&[("route", "bicycle"), ("name", "Valley Loop")]),
            element(&[("highway", "path")]),
        ]);
        assert_eq!(classified.hiking.len(), 1);
        assert_eq!(classified.bicycle.len(), 1);
        assert_eq!(classified.mountain_bike.len(), 1);
        assert_eq!(classified.attractions.len(), 1);
    }

    struct FailingGeocoder;
    struct CountingWeather(AtomicUsize);
    struct CountingPlaces(AtomicUsize);

    #[async_trait]
    impl ReverseGeocoder for FailingGeocoder {
        async fn reverse(
            &self,
            _latitude: f64,
            _longitude: f64,
        ) -> Result<LocationEnrichment, CollaboratorError> {
            Err(CollaboratorError::request_failed("geocoding", "HTTP 503"))
        }
    }

    #[async_trait]
    impl WeatherProvider for CountingWeather {
        async fn current(
            &self,
            _latitude: f64,
            _longitude: f64,
        ) -> Result<WeatherSnapshot, CollaboratorError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(WeatherSnapshot {
                temperature: 20.0,
                humidity: 50.0,
                description: "clear sky".into(),
                wind_speed: 1.0,
            })
        }
    }

    #[async_trait]
    impl PlaceDirectory for CountingPlaces {
        async fn nearby(
            &self,
            _latitude: f64,
            _longitude: f64,
        ) -> Result<Vec<PlaceElement>, CollaboratorError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn first_branch_failure_aborts_the_remaining_lookups() {
        let weather = Arc::new(CountingWeather(AtomicUsize::new(0)));
        let places = Arc::new(CountingPlaces(AtomicUsize::new(0)));
        let service = EnrichmentService::new(
            Arc::new(FailingGeocoder),
            weather.clone(),
            places.clone(),
        );

        let result = service.enrich(47.5, 11.1).await;
        assert!(result.is_err());
        assert_eq!(weather.0.load(Ordering::SeqCst), 0);
        assert_eq!(places.0.load(Ordering::SeqCst), 0);
    }
}
