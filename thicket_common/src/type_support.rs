use crate::ThicketError;
use serde::Serialize;
use thicket_core::action::{Action, ActionConfig, IsActionConfig};
use thicket_core::as_any::AsAnyHelper;

/// Trait to create actions out of thin air.
pub trait ActionFactory: std::fmt::Debug {
    fn create(&self) -> Box<dyn Action>;
}

pub trait DefaultActionFactoryRequirements: Action + Clone + Default + 'static {}
impl<T> DefaultActionFactoryRequirements for T where T: Action + Clone + Default + 'static {}

/// Factory that returns `T::default()`.
pub struct DefaultActionFactory<T: DefaultActionFactoryRequirements> {
    _z: std::marker::PhantomData<T>,
}

impl<T: DefaultActionFactoryRequirements> std::fmt::Debug for DefaultActionFactory<T> {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(fmt, "DefaultActionFactory<{}>", std::any::type_name::<T>())
    }
}

impl<T: DefaultActionFactoryRequirements> DefaultActionFactory<T> {
    pub fn new() -> Self {
        Self {
            _z: std::marker::PhantomData,
        }
    }
}

impl<T: DefaultActionFactoryRequirements> Default for DefaultActionFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: DefaultActionFactoryRequirements> ActionFactory for DefaultActionFactory<T> {
    fn create(&self) -> Box<dyn Action> {
        Box::new(T::default())
    }
}

/// Moves action configs in and out of their serialized form.
pub trait ConfigConverter: std::fmt::Debug {
    fn config_serialize(
        &self,
        config: &dyn ActionConfig,
    ) -> Result<Box<dyn erased_serde::Serialize>, ThicketError>;
    fn config_deserialize(
        &self,
        config: &mut dyn erased_serde::Deserializer,
    ) -> Result<Box<dyn ActionConfig>, ThicketError>;
}

pub trait DefaultConfigRequirements:
    Serialize + serde::de::DeserializeOwned + IsActionConfig
{
}
impl<T> DefaultConfigRequirements for T where
    T: Serialize + serde::de::DeserializeOwned + IsActionConfig
{
}

/// Converter for any serde config struct.
pub struct DefaultConfigConverter<T: DefaultConfigRequirements> {
    _z: std::marker::PhantomData<T>,
}

impl<T: DefaultConfigRequirements> std::fmt::Debug for DefaultConfigConverter<T> {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(fmt, "DefaultConfigConverter<{}>", std::any::type_name::<T>())
    }
}

impl<T: DefaultConfigRequirements> DefaultConfigConverter<T> {
    pub fn new() -> Self {
        Self {
            _z: std::marker::PhantomData,
        }
    }
}

impl<T: DefaultConfigRequirements> Default for DefaultConfigConverter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: DefaultConfigRequirements> ConfigConverter for DefaultConfigConverter<T> {
    fn config_serialize(
        &self,
        config: &dyn ActionConfig,
    ) -> Result<Box<dyn erased_serde::Serialize>, ThicketError> {
        let v = (*config)
            .downcast_ref::<T>()
            .ok_or_else(|| ThicketError::ConfigMismatch {
                expected: std::any::type_name::<T>(),
                actual: config.type_name().to_owned(),
            })?;
        Ok(Box::new(v.clone()))
    }

    fn config_deserialize(
        &self,
        config: &mut dyn erased_serde::Deserializer,
    ) -> Result<Box<dyn ActionConfig>, ThicketError> {
        Ok(Box::new(erased_serde::deserialize::<T>(config)?))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde::Deserialize;
    use thicket_core::node_prelude::*;

    #[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
    pub struct DummyConfig {
        nonzero: f32,
        interval: f64,
    }
    impl IsActionConfig for DummyConfig {}

    impl Default for DummyConfig {
        fn default() -> Self {
            Self {
                nonzero: 1337.0,
                interval: 0.5,
            }
        }
    }

    #[derive(Debug, Default, Clone)]
    pub struct DummyAction {
        config: DummyConfig,
    }

    impl Action for DummyAction {
        fn on_update(&mut self, _: &mut ActionContext) -> Result<NodeStatus, ActionError> {
            Ok(NodeStatus::Success)
        }

        fn get_config(&self) -> Option<Box<dyn ActionConfig>> {
            Some(Box::new(self.config.clone()))
        }

        fn set_config(&mut self, config: &dyn ActionConfig) -> Result<(), ActionError> {
            self.config.load_action_config(config)
        }

        fn static_type() -> ActionType {
            "dummy".into()
        }

        fn action_type(&self) -> ActionType {
            Self::static_type()
        }
    }

    #[test]
    fn factory_and_converter() -> Result<(), ThicketError> {
        let factory: Box<dyn ActionFactory> = Box::new(DefaultActionFactory::<DummyAction>::new());
        let mut boxed = factory.create();
        {
            let dummy = (*boxed)
                .downcast_ref::<DummyAction>()
                .ok_or(ActionError::Failed("wrong type".into()))?;
            assert_eq!(dummy.config, DummyConfig::default());
        }

        let converter: Box<dyn ConfigConverter> =
            Box::new(DefaultConfigConverter::<DummyConfig>::new());
        let input = DummyConfig {
            nonzero: 50.3,
            interval: 30.3,
        };
        let config: Box<dyn ActionConfig> = Box::new(input.clone());

        let serializable = converter.config_serialize(&*config)?;
        let config_json = serde_json::to_string(&serializable)?;
        assert_eq!(config_json, serde_json::to_string(&input)?);

        let mut json_deser = serde_json::Deserializer::from_str(&config_json);
        let mut erased = <dyn erased_serde::Deserializer>::erase(&mut json_deser);
        let restored = converter.config_deserialize(&mut erased)?;
        boxed.set_config(&*restored)?;
        let dummy = (*boxed)
            .downcast_ref::<DummyAction>()
            .ok_or(ActionError::Failed("wrong type".into()))?;
        assert_eq!(dummy.config, input);

        let wrong: Box<dyn ActionConfig> = Box::new(NotDummy);
        assert!(matches!(
            converter.config_serialize(&*wrong),
            Err(ThicketError::ConfigMismatch { actual, .. }) if actual.ends_with("NotDummy")
        ));
        Ok(())
    }

    #[derive(Debug, Clone)]
    struct NotDummy;
    impl IsActionConfig for NotDummy {}
}
