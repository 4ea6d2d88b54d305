//! Sending observations to, and collecting predictions from, every model.

use tracing::info;

use wt_client::ModelService;
use wt_types::{FeatureMapping, Observation, ServiceError, TrialParameters};

/// Train every model the service currently knows with one observation.
///
/// Each model receives exactly one `train` call. Returns the models trained.
pub async fn train_all<M: ModelService + ?Sized>(
    service: &M,
    mapping: FeatureMapping,
    observation: &Observation,
) -> Result<Vec<String>, ServiceError> {
    let features = mapping.features(&observation.params);
    let models = service.list_models().await?;
    for model in &models {
        info!(
            model = %model,
            features = %features,
            label = observation.seconds,
            "training model"
        );
        service.train(model, &features, observation.seconds).await?;
    }
    Ok(models)
}

/// Ask every model the service currently knows for a prediction.
pub async fn predict_all<M: ModelService + ?Sized>(
    service: &M,
    mapping: FeatureMapping,
    params: &TrialParameters,
) -> Result<Vec<(String, f64)>, ServiceError> {
    let features = mapping.features(params);
    let models = service.list_models().await?;
    let mut predictions = Vec::with_capacity(models.len());
    for model in models {
        let predicted = service.predict(&model, &features).await?;
        info!(model = %model, features = %features, predicted, "model prediction");
        predictions.push((model, predicted));
    }
    Ok(predictions)
}
