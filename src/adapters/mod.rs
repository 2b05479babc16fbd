pub mod media_devices;
