//! Ambient light sensor abstraction (photoresistor on an ADC pin).

/// Ambient light sensor collaborator.
pub trait LightSensor {
    /// Raw ADC reading; larger means brighter.
    fn read(&mut self) -> u16;
}
